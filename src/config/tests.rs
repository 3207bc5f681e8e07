use super::*;

#[test]
fn cli_overrides_take_highest_precedence() {
    let mut raw = RawSettings::default();
    raw.logging.level = Some("info".to_string());
    raw.database.url = Some("postgres://from-file".to_string());

    let overrides = GlobalOverrides {
        database_url: Some("postgres://from-cli".to_string()),
        log_level: Some("debug".to_string()),
        ..Default::default()
    };

    raw.apply_global_overrides(&overrides);
    let settings = Settings::from_raw(raw).expect("valid settings");

    assert_eq!(
        settings.database.url.as_deref(),
        Some("postgres://from-cli")
    );
    assert_eq!(settings.logging.level, LevelFilter::DEBUG);
}

#[test]
fn defaults_keep_render_output_unadorned() {
    let settings = Settings::from_raw(RawSettings::default()).expect("valid settings");

    assert!(!settings.render.markdown_byline);
    assert!(!settings.render.sanitize_html);
    assert!(settings.cache.enabled);
    assert_eq!(settings.cache.page_limit, DEFAULT_CACHE_PAGE_LIMIT);
    assert_eq!(
        settings.database.max_connections.get(),
        DEFAULT_DB_MAX_CONNECTIONS
    );
    assert!(settings.database.url.is_none());
}

#[test]
fn blank_database_url_is_treated_as_unset() {
    let mut raw = RawSettings::default();
    raw.database.url = Some("   ".to_string());

    let settings = Settings::from_raw(raw).expect("valid settings");
    assert!(settings.database.url.is_none());
}

#[test]
fn zero_page_limit_is_rejected() {
    let mut raw = RawSettings::default();
    raw.cache.page_limit = Some(0);

    let err = Settings::from_raw(raw).unwrap_err();
    assert!(matches!(
        err,
        LoadError::Invalid {
            key: "cache.page_limit",
            ..
        }
    ));
}

#[test]
fn unknown_log_level_is_rejected() {
    let mut raw = RawSettings::default();
    raw.logging.level = Some("loud".to_string());

    let err = Settings::from_raw(raw).unwrap_err();
    assert!(matches!(
        err,
        LoadError::Invalid {
            key: "logging.level",
            ..
        }
    ));
}

#[test]
fn cli_json_logging_enforces_format() {
    let mut raw = RawSettings::default();
    let overrides = GlobalOverrides {
        log_json: Some(true),
        ..Default::default()
    };

    raw.apply_global_overrides(&overrides);
    let settings = Settings::from_raw(raw).expect("valid settings");

    assert!(matches!(settings.logging.format, LogFormat::Json));
}

#[test]
fn parse_render_arguments() {
    let args = CliArgs::parse_from([
        "quire",
        "render",
        "index",
        "--json",
        "--markdown-byline",
        "true",
        "--database-url",
        "postgres://example",
    ]);

    assert_eq!(
        args.overrides.database_url.as_deref(),
        Some("postgres://example")
    );
    match args.command {
        Command::Render(render) => {
            assert_eq!(render.page_id, "index");
            assert!(render.json);
            assert_eq!(render.overrides.markdown_byline, Some(true));
            assert_eq!(render.overrides.sanitize_html, None);
        }
        _ => panic!("wrong command parsed"),
    }
}

#[test]
fn render_overrides_apply_to_settings() {
    let mut raw = RawSettings::default();
    raw.render.sanitize_html = Some(false);

    raw.apply_render_overrides(&RenderOverrides {
        sanitize_html: Some(true),
        ..Default::default()
    });
    let settings = Settings::from_raw(raw).expect("valid settings");

    assert!(settings.render.sanitize_html);
    assert!(!settings.render.markdown_byline);
}

#[test]
fn parse_seed_arguments() {
    let args = CliArgs::parse_from(["quire", "seed", "--refresh-layouts"]);

    match args.command {
        Command::Seed(seed) => assert!(seed.refresh_layouts),
        _ => panic!("wrong command parsed"),
    }
}

#[test]
fn parse_lint_layouts() {
    let args = CliArgs::parse_from(["quire", "--log-json", "yes", "lint-layouts"]);

    assert_eq!(args.overrides.log_json, Some(true));
    assert!(matches!(args.command, Command::LintLayouts));
}
