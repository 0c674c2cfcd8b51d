//! Static filter registry: the fixed set of filters and their parameter ranges.
//!
//! Each [`FilterDefinition`] lists one or two [`ParameterSpec`]s. The ranges
//! mirror the slider configuration of the editor screen, so UI collaborators
//! initialise their controls from here instead of hard-coding them.
//!
//! | Filter | Param 1 | Param 2 |
//! |--------|---------|---------|
//! | Exposure | ev, -10..10 | - |
//! | Vibrance | amount, -1..1 | - |
//! | Vignette | intensity, -1..1 | radius, 0..2000 px |
//! | Sepia Tone | intensity, 0..1 | - |
//! | Motion Blur | radius, 0..100 px | angle, -pi..pi rad |

use std::f64::consts::PI;
use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::error::{FilterError, Result};

/// The selectable filters, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterKind {
    Exposure,
    Vibrance,
    Vignette,
    SepiaTone,
    MotionBlur,
}

impl FilterKind {
    pub const ALL: [FilterKind; 5] = [
        FilterKind::Exposure,
        FilterKind::Vibrance,
        FilterKind::Vignette,
        FilterKind::SepiaTone,
        FilterKind::MotionBlur,
    ];

    /// Stable snake_case identifier used by the bindings.
    pub fn as_str(self) -> &'static str {
        match self {
            FilterKind::Exposure => "exposure",
            FilterKind::Vibrance => "vibrance",
            FilterKind::Vignette => "vignette",
            FilterKind::SepiaTone => "sepia_tone",
            FilterKind::MotionBlur => "motion_blur",
        }
    }

    /// Position in [`FilterKind::ALL`].
    pub fn index(self) -> usize {
        self as usize
    }

    /// Resolve an untrusted integer selection (0 = Exposure .. 4 = Motion Blur).
    pub fn from_index(index: i64) -> Result<Self> {
        usize::try_from(index)
            .ok()
            .and_then(|i| Self::ALL.get(i).copied())
            .ok_or_else(|| FilterError::unknown_kind(format!("index {index}")))
    }
}

impl fmt::Display for FilterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FilterKind {
    type Err = FilterError;

    /// Accepts identifiers (`sepia_tone`) and display names (`Sepia Tone`),
    /// ignoring case, spaces, dashes and underscores.
    fn from_str(s: &str) -> Result<Self> {
        let key: String = s
            .chars()
            .filter(|c| !matches!(c, ' ' | '_' | '-'))
            .flat_map(char::to_lowercase)
            .collect();
        match key.as_str() {
            "exposure" => Ok(FilterKind::Exposure),
            "vibrance" => Ok(FilterKind::Vibrance),
            "vignette" => Ok(FilterKind::Vignette),
            "sepiatone" | "sepia" => Ok(FilterKind::SepiaTone),
            "motionblur" => Ok(FilterKind::MotionBlur),
            _ => Err(FilterError::unknown_kind(s)),
        }
    }
}

/// What a parameter value measures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ParameterUnit {
    /// Exposure stops (each +1 doubles linear light).
    Stops,
    /// Unitless strength.
    Amount,
    /// Distance in source pixels; rescaled with the working resolution.
    Pixels,
    /// Angle in radians.
    Radians,
}

/// Range and default of one adjustable parameter.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ParameterSpec {
    pub name: &'static str,
    pub minimum: f64,
    pub maximum: f64,
    pub default: f64,
    pub unit: ParameterUnit,
}

impl ParameterSpec {
    /// Bound `value` into `[minimum, maximum]`. NaN falls back to the default.
    pub fn clamp(&self, value: f64) -> f64 {
        if value.is_nan() {
            self.default
        } else {
            value.clamp(self.minimum, self.maximum)
        }
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.minimum && value <= self.maximum
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FilterDefinition {
    pub kind: FilterKind,
    pub display_name: &'static str,
    pub parameters: &'static [ParameterSpec],
}

impl FilterDefinition {
    pub fn arity(&self) -> usize {
        self.parameters.len()
    }

    pub fn parameter(&self, index: usize) -> Option<&ParameterSpec> {
        self.parameters.get(index)
    }

    /// Default value of every parameter, in order.
    pub fn defaults(&self) -> Vec<f64> {
        self.parameters.iter().map(|p| p.default).collect()
    }

    /// Clamp caller input against this filter's parameters.
    ///
    /// A missing second value takes its default; a second value passed to a
    /// one-parameter filter is dropped. The result always has `arity()` entries.
    pub fn clamp_params(&self, param1: f64, param2: Option<f64>) -> Vec<f64> {
        self.parameters
            .iter()
            .enumerate()
            .map(|(i, spec)| match i {
                0 => spec.clamp(param1),
                _ => param2.map_or(spec.default, |v| spec.clamp(v)),
            })
            .collect()
    }
}

const EXPOSURE_PARAMS: [ParameterSpec; 1] = [ParameterSpec {
    name: "ev",
    minimum: -10.0,
    maximum: 10.0,
    default: 0.0,
    unit: ParameterUnit::Stops,
}];

const VIBRANCE_PARAMS: [ParameterSpec; 1] = [ParameterSpec {
    name: "amount",
    minimum: -1.0,
    maximum: 1.0,
    default: 0.0,
    unit: ParameterUnit::Amount,
}];

const VIGNETTE_PARAMS: [ParameterSpec; 2] = [
    ParameterSpec {
        name: "intensity",
        minimum: -1.0,
        maximum: 1.0,
        default: 0.0,
        unit: ParameterUnit::Amount,
    },
    ParameterSpec {
        name: "radius",
        minimum: 0.0,
        maximum: 2000.0,
        default: 0.0,
        unit: ParameterUnit::Pixels,
    },
];

const SEPIA_PARAMS: [ParameterSpec; 1] = [ParameterSpec {
    name: "intensity",
    minimum: 0.0,
    maximum: 1.0,
    default: 0.0,
    unit: ParameterUnit::Amount,
}];

const MOTION_BLUR_PARAMS: [ParameterSpec; 2] = [
    ParameterSpec {
        name: "radius",
        minimum: 0.0,
        maximum: 100.0,
        default: 0.0,
        unit: ParameterUnit::Pixels,
    },
    ParameterSpec {
        name: "angle",
        minimum: -PI,
        maximum: PI,
        default: 0.0,
        unit: ParameterUnit::Radians,
    },
];

static REGISTRY: [FilterDefinition; 5] = [
    FilterDefinition {
        kind: FilterKind::Exposure,
        display_name: "Exposure",
        parameters: &EXPOSURE_PARAMS,
    },
    FilterDefinition {
        kind: FilterKind::Vibrance,
        display_name: "Vibrance",
        parameters: &VIBRANCE_PARAMS,
    },
    FilterDefinition {
        kind: FilterKind::Vignette,
        display_name: "Vignette",
        parameters: &VIGNETTE_PARAMS,
    },
    FilterDefinition {
        kind: FilterKind::SepiaTone,
        display_name: "Sepia Tone",
        parameters: &SEPIA_PARAMS,
    },
    FilterDefinition {
        kind: FilterKind::MotionBlur,
        display_name: "Motion Blur",
        parameters: &MOTION_BLUR_PARAMS,
    },
];

/// All filter definitions in display order.
pub fn list_filters() -> &'static [FilterDefinition] {
    &REGISTRY
}

pub fn lookup(kind: FilterKind) -> &'static FilterDefinition {
    &REGISTRY[kind.index()]
}

/// Look up a filter from an untrusted name.
pub fn lookup_name(name: &str) -> Result<&'static FilterDefinition> {
    name.parse::<FilterKind>().map(lookup)
}

/// Look up a filter from an untrusted integer selection.
pub fn lookup_index(index: i64) -> Result<&'static FilterDefinition> {
    FilterKind::from_index(index).map(lookup)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_order_matches_kinds() {
        for (i, def) in list_filters().iter().enumerate() {
            assert_eq!(def.kind, FilterKind::ALL[i]);
            assert_eq!(def.kind.index(), i);
            assert_eq!(lookup(def.kind).kind, def.kind);
        }
    }

    #[test]
    fn test_arity_table() {
        assert_eq!(lookup(FilterKind::Exposure).arity(), 1);
        assert_eq!(lookup(FilterKind::Vibrance).arity(), 1);
        assert_eq!(lookup(FilterKind::Vignette).arity(), 2);
        assert_eq!(lookup(FilterKind::SepiaTone).arity(), 1);
        assert_eq!(lookup(FilterKind::MotionBlur).arity(), 2);
    }

    #[test]
    fn test_ranges() {
        let vignette = lookup(FilterKind::Vignette);
        assert_eq!(vignette.parameters[1].name, "radius");
        assert_eq!(vignette.parameters[1].maximum, 2000.0);

        let blur = lookup(FilterKind::MotionBlur);
        assert_eq!(blur.parameters[1].minimum, -PI);
        assert_eq!(blur.parameters[1].maximum, PI);

        for def in list_filters() {
            for spec in def.parameters {
                assert!(spec.minimum < spec.maximum);
                assert!(spec.contains(spec.default));
            }
        }
    }

    #[test]
    fn test_sixth_kind_is_unknown() {
        assert!(matches!(
            lookup_index(5),
            Err(FilterError::UnknownFilterKind(_))
        ));
        assert!(matches!(
            lookup_index(-1),
            Err(FilterError::UnknownFilterKind(_))
        ));
        assert!(matches!(
            lookup_name("posterize"),
            Err(FilterError::UnknownFilterKind(_))
        ));
    }

    #[test]
    fn test_parse_names() {
        assert_eq!("Sepia Tone".parse::<FilterKind>(), Ok(FilterKind::SepiaTone));
        assert_eq!("motion_blur".parse::<FilterKind>(), Ok(FilterKind::MotionBlur));
        assert_eq!("EXPOSURE".parse::<FilterKind>(), Ok(FilterKind::Exposure));
        for kind in FilterKind::ALL {
            assert_eq!(kind.as_str().parse::<FilterKind>(), Ok(kind));
            assert_eq!(lookup(kind).display_name.parse::<FilterKind>(), Ok(kind));
        }
    }

    #[test]
    fn test_clamp_params() {
        let exposure = lookup(FilterKind::Exposure);
        assert_eq!(exposure.clamp_params(25.0, None), vec![10.0]);
        assert_eq!(exposure.clamp_params(-25.0, Some(3.0)), vec![-10.0]);
        assert_eq!(exposure.clamp_params(f64::NAN, None), vec![0.0]);

        let blur = lookup(FilterKind::MotionBlur);
        assert_eq!(blur.clamp_params(50.0, None), vec![50.0, 0.0]);
        assert_eq!(blur.clamp_params(500.0, Some(10.0)), vec![100.0, PI]);
        assert_eq!(
            blur.clamp_params(f64::NEG_INFINITY, Some(f64::NEG_INFINITY)),
            vec![0.0, -PI]
        );
    }

    #[test]
    fn test_serializes_for_bindings() {
        let json = serde_json::to_value(lookup(FilterKind::Vignette)).unwrap();
        assert_eq!(json["kind"], "vignette");
        assert_eq!(json["display_name"], "Vignette");
        assert_eq!(json["parameters"][1]["unit"], "pixels");
    }
}
