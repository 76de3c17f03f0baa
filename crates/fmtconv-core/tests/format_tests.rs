use std::path::Path;

use fmtconv_core::{resolve_format, ConvertError, Format, SUPPORTED_EXTENSIONS};

fn assert_unsupported(path: &str, expected_extension: &str) {
    match resolve_format(path) {
        Err(ConvertError::UnsupportedFormat { path: p, extension }) => {
            assert_eq!(p, Path::new(path));
            assert_eq!(extension, expected_extension);
        }
        other => panic!("expected UnsupportedFormat for {path:?}, got {other:?}"),
    }
}

// ============================================================================
// Supported extensions
// ============================================================================

#[test]
fn resolves_each_supported_extension() {
    assert_eq!(resolve_format("data.json").unwrap(), Format::Json);
    assert_eq!(resolve_format("data.xml").unwrap(), Format::Xml);
    assert_eq!(resolve_format("data.yml").unwrap(), Format::Yaml);
    assert_eq!(resolve_format("data.yaml").unwrap(), Format::Yaml);
}

#[test]
fn yml_and_yaml_are_the_same_format() {
    assert_eq!(
        resolve_format("a.yml").unwrap(),
        resolve_format("b.yaml").unwrap()
    );
}

#[test]
fn extension_match_is_case_insensitive() {
    assert_eq!(
        resolve_format("out.JSON").unwrap(),
        resolve_format("out.json").unwrap()
    );
    assert_eq!(resolve_format("Config.YaML").unwrap(), Format::Yaml);
    assert_eq!(resolve_format("FEED.Xml").unwrap(), Format::Xml);
}

#[test]
fn only_the_last_extension_counts() {
    assert_eq!(resolve_format("archive.xml.json").unwrap(), Format::Json);
    assert_unsupported("data.json.bak", "bak");
}

#[test]
fn directories_in_path_are_ignored() {
    assert_eq!(
        resolve_format("some.dir/nested.v2/file.yaml").unwrap(),
        Format::Yaml
    );
}

#[test]
fn supported_extension_list_matches_router() {
    assert_eq!(SUPPORTED_EXTENSIONS, &[".json", ".xml", ".yml", ".yaml"]);
    for ext in SUPPORTED_EXTENSIONS {
        assert!(Format::from_extension(ext).is_some(), "{ext} must resolve");
        assert!(
            Format::from_extension(&ext.to_uppercase()).is_some(),
            "{ext} must resolve in upper case"
        );
    }
}

// ============================================================================
// Rejections
// ============================================================================

#[test]
fn rejects_unknown_extension_with_payload() {
    assert_unsupported("a.txt", "txt");
    assert_unsupported("b.TOML", "TOML");
}

#[test]
fn rejects_missing_extension() {
    assert_unsupported("Makefile", "");
    assert_unsupported("dir/noext", "");
}

#[test]
fn bare_dotfile_has_no_extension() {
    assert_unsupported(".json", "");
}

#[test]
fn unsupported_error_message_names_extension() {
    let err = resolve_format("notes.txt").unwrap_err();
    let message = err.to_string();
    assert!(message.contains("'.txt'"), "message: {message}");
    assert!(message.contains("notes.txt"), "message: {message}");

    let err = resolve_format("notes").unwrap_err();
    assert!(err.to_string().contains("no extension"), "{err}");
}

// ============================================================================
// Format metadata
// ============================================================================

#[test]
fn format_names_and_extensions() {
    assert_eq!(Format::Json.name(), "JSON");
    assert_eq!(Format::Yaml.extensions(), &[".yml", ".yaml"]);
    assert_eq!(Format::Xml.extensions(), &[".xml"]);
    assert_eq!(Format::from_extension("md"), None);
}
