//! Product templates for quick research runs

use crate::components::Product;

fn product(name: &str, description: &str, value_proposition: &str, target_market: &str) -> Product {
    Product {
        name: name.into(),
        description: description.into(),
        value_proposition: value_proposition.into(),
        target_market: target_market.into(),
    }
}

pub fn default_products() -> Vec<Product> {
    vec![
        product(
            "FlexSpace System",
            "Modular shower system on a magnetic wall rail; parts attach without tools, \
             from child-height hand showers to seats with grab bars.",
            "Adapts to every stage of life, from the first flat to an accessible bathroom.",
            "Renters, young families, people in transition",
        ),
        product(
            "AIR Adaptive Room",
            "Bathroom system with discreet sensors in the fittings that learns usage \
             patterns and monitors water quality in real time.",
            "Self-optimising bathroom with predictive maintenance.",
            "Luxury homes, hotels, tech-savvy households",
        ),
        product(
            "Connect Hub",
            "Central unit that links every water appliance in the house, tracks \
             consumption and detects leaks.",
            "One device to manage all the water in your home.",
            "Home modernisers, smart home enthusiasts",
        ),
        product(
            "PureFlow System",
            "Triple system that filters, cleans and recycles water for different uses.",
            "Sustainability without sacrifice, with real savings on water bills.",
            "Eco-conscious families and households",
        ),
    ]
}

/// Case-insensitive lookup among the templates
pub fn find_product(name: &str) -> Option<Product> {
    default_products()
        .into_iter()
        .find(|p| p.name.eq_ignore_ascii_case(name.trim()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_product() {
        assert_eq!(find_product("connect hub").unwrap().name, "Connect Hub");
        assert!(find_product("Time Machine").is_none());
    }
}
