//! Predicate filter over component descriptors. All bounds are inclusive.
use super::component::Component;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ComponentFilter {
    pub min_area: u32,
    pub max_area: u32,
    pub min_aspect_ratio: f64,
    pub max_aspect_ratio: f64,
    pub exclude_border_touching: bool,
}

impl Default for ComponentFilter {
    fn default() -> Self {
        Self {
            min_area: 0,
            max_area: u32::MAX,
            min_aspect_ratio: 0.0,
            max_aspect_ratio: f64::INFINITY,
            exclude_border_touching: false,
        }
    }
}

impl ComponentFilter {
    pub fn with_min_area(min_area: u32) -> Self {
        Self {
            min_area,
            ..Self::default()
        }
    }

    pub fn accepts(&self, c: &Component) -> bool {
        (self.min_area..=self.max_area).contains(&c.area)
            && c.aspect_ratio >= self.min_aspect_ratio
            && c.aspect_ratio <= self.max_aspect_ratio
            && !(self.exclude_border_touching && c.touches_border)
    }

    /// Components passing the filter, in their original order.
    pub fn apply(&self, components: &[Component]) -> Vec<Component> {
        components.iter().filter(|c| self.accepts(c)).cloned().collect()
    }
}
