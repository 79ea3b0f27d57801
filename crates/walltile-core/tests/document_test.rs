use walltile_core::{Error, TileCoord, parse_document};

const GRID: &str = r#"<dimensions screenWidth="100" screenHeight="50" numTilesWidth="2"
    numTilesHeight="2" mullionWidth="4" mullionHeight="6" debug="0"/>"#;

fn doc(body: &str) -> String {
    format!("<configuration>{GRID}{body}</configuration>")
}

fn malformed_attribute(err: Error) -> String {
    match err {
        Error::MalformedSpec { attribute, .. } => attribute,
        other => panic!("expected MalformedSpec, got {other:?}"),
    }
}

#[test]
fn parses_entries_in_document_order() {
    let text = doc(r#"
        <head host="lead" port="7000" rank="0"><surface width="204" height="106"/></head>
        <node host="b" rank="2" display=":0"><tile i="1" j="1"/><tile i="0" j="1"/></node>
        <child host="a" rank="1" display=":0"><tile i="0" j="0"/></child>
    "#);
    let parsed = parse_document(&text).unwrap();

    assert_eq!(parsed.grid.tile_width, 100);
    assert_eq!(parsed.grid.tile_height, 50);
    assert_eq!((parsed.grid.tiles_x, parsed.grid.tiles_y), (2, 2));
    assert_eq!((parsed.grid.bezel_x, parsed.grid.bezel_y), (4, 6));
    assert!(!parsed.grid.debug_enabled);

    let leader = parsed.leader.as_ref().unwrap();
    assert_eq!(leader.host, "lead");
    assert_eq!(leader.port, 7000);
    assert_eq!((leader.surface.width, leader.surface.height), (204, 106));

    let hosts: Vec<&str> = parsed.hosts.iter().map(|h| h.host.as_str()).collect();
    assert_eq!(hosts, vec!["b", "a"]);
    assert_eq!(
        parsed.hosts[0].tiles,
        vec![TileCoord::new(1, 1), TileCoord::new(0, 1)]
    );
    assert_eq!(parsed.entry_count, 4);
}

#[test]
fn accepts_a_wrapped_configuration_root() {
    let text = format!(
        "<wall>{}</wall>",
        doc(r#"<child host="a" rank="1" display=":0"><tile i="0" j="0"/></child>"#)
    );
    assert_eq!(parse_document(&text).unwrap().hosts.len(), 1);
}

#[test]
fn debug_is_on_only_for_one() {
    let text = r#"<configuration><dimensions screenWidth="1" screenHeight="1" numTilesWidth="1"
        numTilesHeight="1" mullionWidth="0" mullionHeight="0" debug="1"/></configuration>"#;
    assert!(parse_document(text).unwrap().grid.debug_enabled);
    let text = text.replace("debug=\"1\"", "debug=\"2\"");
    assert!(!parse_document(&text).unwrap().grid.debug_enabled);
}

#[test]
fn missing_dimensions_entry_is_malformed() {
    let err = parse_document("<configuration/>").unwrap_err();
    assert_eq!(malformed_attribute(err), "dimensions");
}

#[test]
fn missing_attribute_is_malformed() {
    let err = parse_document(&doc(r#"<child host="a" display=":0"><tile i="0" j="0"/></child>"#))
        .unwrap_err();
    assert_eq!(malformed_attribute(err), "rank");
}

#[test]
fn non_integer_attribute_is_malformed() {
    let err = parse_document(&doc(
        r#"<child host="a" rank="1" display=":0"><tile i="zero" j="0"/></child>"#,
    ))
    .unwrap_err();
    let message = err.to_string();
    assert!(message.contains("`i`"), "{message}");
    assert!(message.contains("zero"), "{message}");
}

#[test]
fn negative_sizes_are_malformed() {
    let text = GRID.replace("mullionWidth=\"4\"", "mullionWidth=\"-4\"");
    let err = parse_document(&format!("<configuration>{text}</configuration>")).unwrap_err();
    assert_eq!(malformed_attribute(err), "mullionWidth");
}

#[test]
fn empty_grid_is_malformed() {
    let text = GRID.replace("numTilesHeight=\"2\"", "numTilesHeight=\"0\"");
    let err = parse_document(&format!("<configuration>{text}</configuration>")).unwrap_err();
    assert_eq!(malformed_attribute(err), "numTilesHeight");
}

#[test]
fn leader_without_surface_is_malformed() {
    let err = parse_document(&doc(r#"<head host="lead" port="7000" rank="0"/>"#)).unwrap_err();
    assert_eq!(malformed_attribute(err), "width");
}

#[test]
fn host_without_tiles_is_malformed() {
    let err = parse_document(&doc(r#"<child host="a" rank="1" display=":0"/>"#)).unwrap_err();
    assert_eq!(malformed_attribute(err), "tile");
}

#[test]
fn tile_outside_the_grid_is_malformed() {
    let err = parse_document(&doc(
        r#"<child host="a" rank="1" display=":0"><tile i="2" j="0"/></child>"#,
    ))
    .unwrap_err();
    assert!(err.to_string().contains("outside the 2x2 grid"), "{err}");
}

#[test]
fn duplicate_tile_is_malformed() {
    let err = parse_document(&doc(
        r#"<child host="a" rank="1" display=":0"><tile i="1" j="0"/><tile i="1" j="0"/></child>"#,
    ))
    .unwrap_err();
    assert!(err.to_string().contains("more than once"), "{err}");
}

#[test]
fn duplicate_rank_is_malformed() {
    let err = parse_document(&doc(r#"
        <child host="a" rank="1" display=":0"><tile i="0" j="0"/></child>
        <child host="b" rank="1" display=":0"><tile i="1" j="0"/></child>
    "#))
    .unwrap_err();
    assert_eq!(malformed_attribute(err), "rank");
}

#[test]
fn host_reusing_the_leader_rank_is_malformed() {
    let err = parse_document(&doc(r#"
        <head host="lead" port="7000" rank="0"><surface width="1" height="1"/></head>
        <child host="a" rank="0" display=":0"><tile i="0" j="0"/></child>
    "#))
    .unwrap_err();
    assert_eq!(malformed_attribute(err), "rank");
}

#[test]
fn duplicate_host_and_display_is_malformed() {
    let err = parse_document(&doc(r#"
        <child host="a" rank="1" display=":0"><tile i="0" j="0"/></child>
        <child host="a" rank="2" display=":0"><tile i="1" j="0"/></child>
    "#))
    .unwrap_err();
    assert_eq!(malformed_attribute(err), "display");
}

#[test]
fn invalid_xml_is_reported() {
    let err = parse_document("<configuration>").unwrap_err();
    assert!(matches!(err, Error::Xml(_)));
}

#[test]
fn missing_file_is_an_io_error() {
    let err = walltile_core::load_document("does/not/exist.xml").unwrap_err();
    assert!(matches!(err, Error::Io { .. }));
    assert!(err.to_string().contains("does/not/exist.xml"));
}
