use anyhow::{Result, bail};
use tab_gallery_app::{AppConfig, GalleryApp, Resource};
use tab_gallery_core::{ResolvedTab, SettingsPatch, TabRegistry};
use tab_gallery_store_fs::KeyValueStore;

use crate::{Command, OutputFormat};

pub async fn run<S: KeyValueStore>(command: Command, app: &GalleryApp<S>, config: &AppConfig) -> Result<()> {
    match command {
        Command::Show => {
            println!("{}", serde_json::to_string_pretty(&app.settings().current())?);
        }
        Command::Tabs { all, format } => {
            let tabs: Vec<ResolvedTab> = {
                let shell = app.navigation();
                shell
                    .tabs()
                    .iter()
                    .filter(|tab| all || tab.visible)
                    .cloned()
                    .collect()
            };
            match format {
                OutputFormat::Table => print!("{}", render_tabs(&tabs)),
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&tabs)?),
            }
        }
        Command::SetLevel { level } => {
            let settings = app.update_settings(SettingsPatch::ui_level(level)).await;
            println!("ui level: {}", settings.ui_level);
        }
        Command::TabLevel { tab, level, clear } => {
            ensure_known_tab(app.navigation().registry(), &tab)?;
            let current = app.settings().current();
            let patch = match (level, clear) {
                (_, true) => current.without_tab_level(&tab),
                (Some(level), false) => current.with_tab_level(&tab, level),
                (None, false) => bail!("either a level or --clear is required"),
            };
            let settings = app.update_settings(patch).await;
            match settings.tab_level(&tab) {
                Some(level) => println!("{tab}: visible from level {level}"),
                None => println!("{tab}: using default level"),
            }
        }
        Command::Rename { tab, title } => {
            ensure_known_tab(app.navigation().registry(), &tab)?;
            let patch = app.settings().current().with_tab_rename(&tab, &title);
            app.update_settings(patch).await;
            println!("{tab}: renamed to {title:?}");
        }
        Command::Focus { example } => {
            let patch = app.settings().current().with_focused_example(&example);
            let settings = app.update_settings(patch).await;
            println!("focused: {}", settings.focused_examples.join(", "));
        }
        Command::Unfocus { example } => {
            let patch = app.settings().current().without_focused_example(&example);
            let settings = app.update_settings(patch).await;
            println!("focused: {}", settings.focused_examples.join(", "));
        }
        Command::Overrides { json } => {
            app.update_settings(SettingsPatch::overrides(json)).await;
            println!("overrides updated");
        }
        Command::Resources => {
            print!("{}", render_resources(&app.resources().current()));
        }
        Command::Reset => {
            let patch = SettingsPatch::replace_all(config.default_settings());
            let settings = app.update_settings(patch).await;
            println!("settings reset (ui level {})", settings.ui_level);
        }
    }
    Ok(())
}

fn ensure_known_tab(registry: &TabRegistry, tab: &str) -> Result<()> {
    if registry.contains(tab) {
        return Ok(());
    }
    bail!("unknown tab '{tab}'. Known tabs: {}.", registry.names_hint());
}

fn render_tabs(tabs: &[ResolvedTab]) -> String {
    if tabs.is_empty() {
        return "No tabs visible\n".to_owned();
    }
    let name_width = tabs.iter().map(|tab| tab.name.len()).max().unwrap_or(0);
    let title_width = tabs.iter().map(|tab| tab.title.len()).max().unwrap_or(0);
    tabs.iter()
        .map(|tab| {
            format!(
                "{:<name_width$}  {:<title_width$}  {:<28}  {}\n",
                tab.name,
                tab.title,
                tab.icon.unwrap_or("-"),
                if tab.visible { "visible" } else { "hidden" },
            )
        })
        .collect()
}

fn render_resources(resources: &[Resource]) -> String {
    resources
        .iter()
        .map(|resource| format!("{} | {} | {} | {}\n", resource.id, resource.kind, resource.title, resource.url))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tab_gallery_core::{Settings, UiLevel, resolve_all};

    #[test]
    fn table_lists_name_title_icon_and_state() {
        let registry = TabRegistry::builtin();
        let settings = Settings::default().merged(SettingsPatch::ui_level(UiLevel::INTERMEDIATE));
        let rendered = render_tabs(&resolve_all(&registry, &settings));

        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines.len(), registry.len());
        assert!(lines[0].starts_with("index"));
        assert!(lines[0].contains("Intermediate"));
        assert!(lines[0].ends_with("visible"));
        assert!(lines.iter().any(|line| line.starts_with("maps") && line.ends_with("hidden")));
    }

    #[test]
    fn empty_table_says_so() {
        assert_eq!(render_tabs(&[]), "No tabs visible\n");
    }

    #[test]
    fn unknown_tab_error_lists_registry() {
        let Err(err) = ensure_known_tab(&TabRegistry::builtin(), "battery") else {
            panic!("battery is not a tab");
        };
        let message = err.to_string();
        assert!(message.contains("unknown tab 'battery'"));
        assert!(message.contains("index, explore"));
    }

    #[test]
    fn resources_render_one_per_line() {
        let rendered = render_resources(&Resource::catalogue());
        assert_eq!(rendered.lines().count(), Resource::catalogue().len());
        assert!(rendered.starts_with("battery | docs | Battery | https://"));
        assert!(rendered.contains("examples | sample | "));
    }
}
