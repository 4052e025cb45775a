use super::*;

#[test]
fn settings_use_camel_case_and_defaults() {
    let settings: Settings = serde_json::from_str(r#"{"purge": true}"#).unwrap();
    assert!(settings.purge);
    assert!(settings.purge_interactive);
    assert!(!settings.auto_update);

    let json = serde_json::to_value(Settings::default()).unwrap();
    assert_eq!(json["purgeInteractive"], true);
    assert_eq!(json["autoUpdate"], false);
}

#[test]
fn mas_ids_accept_numbers_and_strings() {
    let section: MacosSection =
        serde_json::from_str(r#"{"mas": {"Xcode": 497799835, "Pages": " 409201541 "}}"#).unwrap();
    assert_eq!(section.mas["Xcode"].to_string(), "497799835");
    assert_eq!(section.mas["Pages"].to_string(), "409201541");
}

#[test]
fn empty_optional_lists_are_not_serialized() {
    let config = DeclaredConfig {
        macos: Some(MacosSection::default()),
        ..DeclaredConfig::default()
    };
    let json = serde_json::to_value(&config).unwrap();
    assert_eq!(json["global"], serde_json::json!({"packages": []}));
    assert!(json["macos"].get("cargo").is_none());
    assert!(json.get("linux").is_none());
}

#[test]
fn v2_sections_parse() {
    let config: DeclaredConfig = serde_json::from_str(
        r#"{
            "version": 2,
            "global": {"packages": ["git"], "cargo": ["ripgrep"]},
            "linux": {"packages": ["vim"], "flatpak": ["org.gimp.GIMP"]},
            "arch": {"packages": ["base-devel"], "aur": ["yay-bin"]},
            "fedora": {"packages": [], "copr": ["atim/lazygit"]}
        }"#,
    )
    .unwrap();

    assert_eq!(config.global.cargo, vec!["ripgrep"]);
    assert_eq!(config.linux.unwrap().flatpak, vec!["org.gimp.GIMP"]);
    assert_eq!(config.arch.unwrap().aur, vec!["yay-bin"]);
    assert_eq!(config.fedora.unwrap().copr, vec!["atim/lazygit"]);
    assert!(config.debian.is_none());
}
