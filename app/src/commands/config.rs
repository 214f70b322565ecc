use anyhow::Result;

use crate::state::AppState;

fn render_config(state: &AppState) -> Result<String> {
    let mut text = state.config.to_toml()?;
    text.push_str(&format!("# session file in use: {}\n", state.session_path.display()));
    Ok(text)
}

/// Print the effective configuration
pub fn get_config(state: &AppState) -> Result<()> {
    let text = render_config(state)?;
    state.emit(&state.config, |_| text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LabConfig;

    #[test]
    fn test_render_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lab.json");
        let state = AppState::new(LabConfig::default(), Some(path.clone()), false).unwrap();

        let text = render_config(&state).unwrap();
        assert!(text.starts_with("default_segment = \"Growing Families\""));
        assert!(text.ends_with(&format!("# session file in use: {}\n", path.display())));
    }
}
