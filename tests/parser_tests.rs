use perftopo::discovery::parser::{
    parse_metadata_key, parse_throughput_average, parse_traceroute,
};
use perftopo::shared::ParseError;
use perftopo::topology::Edge;

fn traceroute_page(title: &str, pre: &str) -> String {
    format!("<html><head><title>{title}</title></head><body><pre>{pre}</pre></body></html>")
}

#[test]
fn test_parses_probe_address_path_and_edges() {
    let body = traceroute_page("10.0.0.1 traceroute", "1  10.0.0.2  5ms\n2  10.0.0.3  8ms");

    let segments = parse_traceroute(&body).unwrap();

    assert_eq!(segments.nodes, vec!["10.0.0.1", "10.0.0.2", "10.0.0.3"]);
    assert_eq!(segments.edges, vec![Edge::new("10.0.0.2", "10.0.0.3")]);
}

#[test]
fn test_probe_host_is_not_edge_connected_to_the_first_hop() {
    let body = traceroute_page(
        "192.0.2.1",
        "1  192.0.2.10  3ms\n2  192.0.2.20  7ms\n3  192.0.2.30  9ms",
    );

    let segments = parse_traceroute(&body).unwrap();

    assert_eq!(segments.edges.len(), 2);
    assert!(segments
        .edges
        .iter()
        .all(|edge| edge.hop_a != "192.0.2.1" && edge.hop_b != "192.0.2.1"));
}

#[test]
fn test_hop_filter_drops_lines_without_rtt_or_address() {
    let pre = "traceroute to target host\n\
               1  192.0.2.10  3ms\n\
               2  * * *\n\
               3  unresponsive gateway ms\n\
               4  192.0.2.20  7ms";

    let segments = parse_traceroute(&traceroute_page("192.0.2.1", pre)).unwrap();

    assert_eq!(segments.nodes, vec!["192.0.2.1", "192.0.2.10", "192.0.2.20"]);
    assert_eq!(segments.edges, vec![Edge::new("192.0.2.10", "192.0.2.20")]);
}

#[test]
fn test_literal_newline_markers_still_split_hops() {
    // CGI output that crossed a bytes round-trip carries two-character
    // backslash-n markers instead of real newlines.
    let pre = r"1  10.0.0.2  5ms\n2  10.0.0.3  8ms\n3  10.0.0.4  11ms";

    let segments = parse_traceroute(&traceroute_page("10.0.0.1", pre)).unwrap();

    assert_eq!(segments.nodes.len(), 4);
    assert_eq!(
        segments.edges,
        vec![
            Edge::new("10.0.0.2", "10.0.0.3"),
            Edge::new("10.0.0.3", "10.0.0.4"),
        ]
    );
}

#[test]
fn test_first_dotted_quad_on_a_line_wins() {
    let pre = "1  border-r1.example.net (10.0.0.2)  4.1 ms\n\
               2  border-r2.example.net (10.0.0.3)  8.9 ms";

    let segments = parse_traceroute(&traceroute_page("10.0.0.1 reverse traceroute", pre)).unwrap();

    assert_eq!(segments.nodes, vec!["10.0.0.1", "10.0.0.2", "10.0.0.3"]);
}

#[test]
fn test_edge_count_is_hop_count_minus_one() {
    for hops in 0..5usize {
        let lines: Vec<String> = (0..hops)
            .map(|i| format!("{}  10.0.1.{}  {}ms", i + 1, i + 1, i + 2))
            .collect();
        let body = traceroute_page("10.0.0.1", &lines.join("\n"));

        let segments = parse_traceroute(&body).unwrap();

        assert_eq!(segments.nodes.len(), 1 + hops);
        assert_eq!(segments.edges.len(), hops.saturating_sub(1));
    }
}

#[test]
fn test_missing_title_fails_the_command() {
    let body = "<html><body><pre>1  10.0.0.2  5ms</pre></body></html>";
    assert!(matches!(
        parse_traceroute(body),
        Err(ParseError::MissingTitle)
    ));
}

#[test]
fn test_title_without_probe_address_fails_the_command() {
    let body = traceroute_page("reverse traceroute", "1  10.0.0.2  5ms");
    assert!(matches!(
        parse_traceroute(&body),
        Err(ParseError::MissingProbeAddress)
    ));
}

#[test]
fn test_missing_hop_block_fails_the_command() {
    let body = "<html><head><title>10.0.0.1</title></head><body>bad gateway</body></html>";
    assert!(matches!(
        parse_traceroute(body),
        Err(ParseError::MissingHopBlock)
    ));
}

#[test]
fn test_throughput_average_is_the_arithmetic_mean() {
    let average = parse_throughput_average(r#"[{"val":10},{"val":20}]"#).unwrap();
    assert_eq!(average, Some(15.0));
}

#[test]
fn test_empty_sample_window_yields_no_average() {
    assert_eq!(parse_throughput_average("[]").unwrap(), None);
}

#[test]
fn test_samples_with_extra_fields_still_average() {
    let body = r#"[{"ts":1525132800,"val":2.5},{"ts":1525219200,"val":7.5}]"#;
    assert_eq!(parse_throughput_average(body).unwrap(), Some(5.0));
}

#[test]
fn test_sample_without_val_is_malformed() {
    assert!(matches!(
        parse_throughput_average(r#"[{"ts":1525132800}]"#),
        Err(ParseError::Json(_))
    ));
}

#[test]
fn test_metadata_key_comes_from_the_first_entry() {
    let body = r#"[{"metadata-key":"4a5b6c","event-types":[]},{"metadata-key":"ignored"}]"#;
    assert_eq!(parse_metadata_key(body).unwrap(), Some("4a5b6c".to_string()));
}

#[test]
fn test_empty_archive_listing_yields_no_key() {
    assert_eq!(parse_metadata_key("[]").unwrap(), None);
}

#[test]
fn test_archive_entry_without_key_is_malformed() {
    assert!(matches!(
        parse_metadata_key(r#"[{"event-types":[]}]"#),
        Err(ParseError::MissingMetadataKey)
    ));
}

#[test]
fn test_non_json_payloads_are_malformed() {
    assert!(matches!(
        parse_metadata_key("<html>error</html>"),
        Err(ParseError::Json(_))
    ));
    assert!(matches!(
        parse_throughput_average("not json"),
        Err(ParseError::Json(_))
    ));
}
