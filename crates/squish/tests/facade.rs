use camino::Utf8Path;
use squish::config::ResolvedConfig;
use squish::{AssetKind, Error, Minifier};

fn utf8(path: &std::path::Path) -> &Utf8Path {
    Utf8Path::from_path(path).unwrap()
}

#[test_log::test]
fn config_is_discovered_from_a_nested_directory() {
    let dir = tempfile::tempdir().unwrap();
    let root = utf8(dir.path());
    fs_err::create_dir_all(root.join(".config")).unwrap();
    fs_err::write(
        root.join(".config/squish.yaml"),
        "max_minification: true\nmax_input_bytes: 64\n",
    )
    .unwrap();
    let nested = root.join("site/pages");
    fs_err::create_dir_all(&nested).unwrap();

    let config = ResolvedConfig::discover_from(&nested).unwrap();
    assert_eq!(config.path.as_deref(), Some(root.join(".config/squish.yaml").as_path()));
    assert!(config.max_minification);
    assert_eq!(config.max_input_bytes, Some(64));

    let minifier = Minifier::from_config(&config);
    assert!(minifier.html.max_minification);
    assert_eq!(minifier.limits.max_input_bytes, Some(64));
}

#[test_log::test]
fn missing_config_means_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let config = ResolvedConfig::discover_from(utf8(dir.path())).unwrap();
    assert_eq!(config, ResolvedConfig::default());
    assert_eq!(Minifier::from_config(&config), Minifier::new());
}

#[test_log::test]
fn malformed_config_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = utf8(dir.path()).join("squish.yaml");
    fs_err::write(&path, "max_template_depth: [1, 2\n").unwrap();
    assert!(ResolvedConfig::load(&path).is_err());
}

#[test_log::test]
fn broken_script_fails_open() {
    let minifier = Minifier::new();
    let source = "var s = 'never closed;";
    assert_eq!(minifier.minify_or_original(AssetKind::Js, source), source);
    assert!(matches!(
        minifier.try_minify(AssetKind::Js, source),
        Err(Error::Script(_))
    ));
}

#[test_log::test]
fn broken_inline_script_fails_open_for_the_whole_page() {
    let minifier = Minifier::new();
    let page = "<p>hi</p>\n<script>var r = /unclosed\n</script>";
    assert_eq!(minifier.minify_or_original(AssetKind::Html, page), page);
    assert!(matches!(
        minifier.try_minify(AssetKind::Html, page),
        Err(Error::Markup(_))
    ));
}

#[test_log::test]
fn oversized_input_is_left_alone() {
    let mut minifier = Minifier::new();
    minifier.limits.max_input_bytes = Some(8);
    let css = "a { color: red; }";

    assert_eq!(minifier.minify_or_original(AssetKind::Css, css), css);
    assert!(matches!(
        minifier.try_minify(AssetKind::Css, css),
        Err(Error::InputTooLarge { len: 17, limit: 8 })
    ));
    assert_eq!(minifier.try_minify(AssetKind::Css, "a{b:c}").unwrap(), "a{b:c}");
}

#[test_log::test]
fn page_with_inline_assets() {
    let minifier = Minifier::new();
    let page = "<!DOCTYPE html>\n<html>\n  <head>\n    <style>\n      p { margin: 0px; }\n    </style>\n  </head>\n  <body>\n    <!-- nav -->\n    <p>Hello world</p>\n  </body>\n</html>\n";
    assert_eq!(
        minifier.try_minify(AssetKind::Html, page).unwrap(),
        "<!DOCTYPE html><html><head><style>p{margin:0}</style></head><body><p>Hello world</p></body></html>"
    );
}
