use anyhow::{Context, Result};
use research::products::{default_products, find_product};
use research::{Product, ResearchSession};
use std::fmt::Write as _;

use crate::state::AppState;

fn render_product(product: &Product) -> String {
    format!(
        "{}\n  {}\n  Value: {}\n  Market: {}\n",
        product.name, product.description, product.value_proposition, product.target_market
    )
}

fn template(name: &str) -> Result<Product> {
    find_product(name).with_context(|| {
        format!(
            "Unknown product: '{}' (use a template or define one with `persona-lab product --name`)",
            name
        )
    })
}

/// Resolve the product for a command.
///
/// An explicit name replaces the session's product unless it already names
/// it (custom products are kept that way). Without a name the session keeps
/// its product, or gets the `default` template.
pub fn select_product(session: &mut ResearchSession, requested: Option<&str>, default: &str) -> Result<()> {
    match requested {
        Some(name) => {
            let current = session
                .product
                .as_ref()
                .is_some_and(|p| p.name.eq_ignore_ascii_case(name.trim()));
            if !current {
                session.set_product(template(name)?);
            }
        }
        None if session.product.is_none() => session.set_product(template(default)?),
        None => {}
    }
    Ok(())
}

pub fn list_products(state: &AppState) -> Result<()> {
    let products = default_products();
    state.emit(&products, |products| products.iter().map(render_product).collect())
}

pub fn show_product(state: &AppState) -> Result<()> {
    let session = state.open_session()?;
    match &session.product {
        Some(product) => state.emit(product, |p| render_product(p)),
        None => {
            let mut text = String::from("No product selected. Templates:\n");
            for p in default_products() {
                let _ = writeln!(text, "  {}", p.name);
            }
            state.emit(&Option::<Product>::None, |_| text)
        }
    }
}

/// Put a template or a hand-described product into the session
pub fn set_product(state: &AppState, product: Product) -> Result<()> {
    let mut session = state.open_session()?;
    session.set_product(product);
    state.save_session(&session)?;
    if let Some(product) = &session.product {
        state.emit(product, |p| render_product(p))?;
    }
    Ok(())
}

pub fn use_template(state: &AppState, name: &str) -> Result<()> {
    set_product(state, template(name)?)
}

pub fn define_product(
    state: &AppState,
    name: &str,
    description: &str,
    value_proposition: &str,
    target_market: &str,
) -> Result<()> {
    set_product(
        state,
        Product::custom(name, description, value_proposition, target_market)?,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LabConfig;

    fn custom() -> Product {
        Product::custom("AquaLoop", "Recycling shower", "Half the water", "Renters").unwrap()
    }

    #[test]
    fn test_default_only_fills_empty_session() {
        let mut session = ResearchSession::new();
        select_product(&mut session, None, "Connect Hub").unwrap();
        assert_eq!(session.product.as_ref().unwrap().name, "Connect Hub");

        session.set_product(custom());
        select_product(&mut session, None, "Connect Hub").unwrap();
        assert_eq!(session.product.as_ref().unwrap().name, "AquaLoop");
    }

    #[test]
    fn test_explicit_product_replaces_session_product() {
        let mut session = ResearchSession::new();
        session.set_product(custom());

        select_product(&mut session, Some("pureflow system"), "Connect Hub").unwrap();
        assert_eq!(session.product.as_ref().unwrap().name, "PureFlow System");
    }

    #[test]
    fn test_naming_the_custom_product_keeps_it() {
        let mut session = ResearchSession::new();
        session.set_product(custom());

        select_product(&mut session, Some("aqualoop"), "Connect Hub").unwrap();
        assert_eq!(session.product, Some(custom()));

        assert!(select_product(&mut session, Some("Hoverboard"), "Connect Hub").is_err());
        assert_eq!(session.product, Some(custom()));
    }

    #[test]
    fn test_define_product_is_saved() {
        let dir = tempfile::tempdir().unwrap();
        let state = AppState::new(LabConfig::default(), Some(dir.path().join("s.json")), true).unwrap();

        define_product(&state, "AquaLoop", "Recycling shower", "Half the water", "Renters").unwrap();
        assert_eq!(state.open_session().unwrap().product, Some(custom()));

        assert!(define_product(&state, " ", "x", "y", "z").is_err());
        use_template(&state, "connect hub").unwrap();
        assert_eq!(state.open_session().unwrap().product.unwrap().name, "Connect Hub");
    }
}
