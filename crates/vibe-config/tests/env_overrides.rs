use figment::{
    Figment, Jail,
    providers::{Env, Format, Serialized, Toml},
};
use vibe_config::VibeConfig;

#[test]
fn env_overrides_nested_sections() {
    Jail::expect_with(|jail| {
        jail.set_env("MYVIBE_HUB__URL", "https://env-hub.example");
        jail.set_env("MYVIBE_MONITOR__POLL_INTERVAL_SECS", "7");

        let config: VibeConfig = VibeConfig::figment().extract()?;
        assert_eq!(config.hub.url, "https://env-hub.example");
        assert_eq!(config.monitor.poll_interval_secs, 7);
        assert_eq!(config.monitor.timeout_secs, 600);
        Ok(())
    });
}

#[test]
fn env_beats_toml() {
    Jail::expect_with(|jail| {
        jail.create_file(
            "config.toml",
            r#"
[hub]
url = "https://toml-hub.example"
component_did = "z8iZcomponent"

[general]
max_archive_mb = 5
"#,
        )?;
        jail.set_env("MYVIBE_HUB__URL", "https://env-hub.example");

        let config: VibeConfig = Figment::from(Serialized::defaults(VibeConfig::default()))
            .merge(Toml::file("config.toml"))
            .merge(Env::prefixed("MYVIBE_").split("__"))
            .extract()?;

        assert_eq!(config.hub.url, "https://env-hub.example");
        assert_eq!(config.hub.component_did, "z8iZcomponent");
        assert!(config.hub.discovery_enabled());
        assert_eq!(config.general.max_archive_bytes(), 5 * 1024 * 1024);
        Ok(())
    });
}

#[test]
fn project_local_config_is_picked_up() {
    Jail::expect_with(|jail| {
        jail.create_dir(".myvibe")?;
        jail.create_file(
            ".myvibe/config.toml",
            "[auth]\ntimeout_secs = 30\n",
        )?;

        let config = VibeConfig::load().expect("config loads");
        assert_eq!(config.auth.timeout_secs, 30);
        assert_eq!(config.auth.poll_interval_secs, 3);
        Ok(())
    });
}
