//! Page manifest: the serde document a host loads to declare its nodes and
//! wire them into effects. Validation happens up front, before a session is
//! built: unknown labels, duplicate declarations, and unusable configs are
//! all rejected here.

use std::collections::HashSet;

use crate::{
    carousel::CarouselConfig,
    ease::Ease,
    error::{KinemaError, KinemaResult},
    interact::PulseSpec,
    marquee::MarqueeConfig,
    reveal::RevealFrom,
    scroll::ScrollerConfig,
    stage::Metrics,
    timeline::TweenSpec,
};

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct Viewport {
    pub height: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self { height: 900.0 }
    }
}

/// A host node: a stable label plus its initial layout metrics.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct NodeDecl {
    pub label: String,
    #[serde(default)]
    pub metrics: Metrics,
}

#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct CarouselDecl {
    pub track: String,
    pub items: Vec<String>,
    #[serde(default)]
    pub prev: Option<String>,
    #[serde(default)]
    pub next: Option<String>,
    #[serde(default)]
    pub config: CarouselConfig,
}

#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct MarqueeDecl {
    pub rows: Vec<MarqueeRowDecl>,
    #[serde(default)]
    pub config: MarqueeConfig,
}

#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct MarqueeRowDecl {
    pub row: String,
    pub tags: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct RevealDecl {
    pub targets: Vec<String>,
    #[serde(default)]
    pub from: RevealFrom,
    #[serde(default = "default_reveal_tween")]
    pub tween: TweenSpec,
    #[serde(default)]
    pub stagger_ms: f64,
    pub trigger: TriggerDecl,
}

fn default_reveal_tween() -> TweenSpec {
    TweenSpec::new(800.0, Ease::OutQuart)
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerDecl {
    OnLoad {
        #[serde(default)]
        delay_ms: f64,
    },
    OnScroll {
        watch: String,
        #[serde(default = "default_viewport_fraction")]
        viewport_fraction: f64,
    },
}

fn default_viewport_fraction() -> f64 {
    0.8
}

/// Built-in press pulse shapes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PressKind {
    Nudge,
    Pop,
    Stretch,
}

impl PressKind {
    pub fn spec(self) -> PulseSpec {
        match self {
            Self::Nudge => PulseSpec::nudge(),
            Self::Pop => PulseSpec::pop(),
            Self::Stretch => PulseSpec::stretch(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct InteractionDecl {
    pub node: String,
    #[serde(default)]
    pub hover: bool,
    #[serde(default)]
    pub press: Option<PressKind>,
}

/// One anchor link. `target: None` declares a placeholder anchor that glides
/// a fixed distance instead of landing on a node.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct AnchorDecl {
    pub href: String,
    #[serde(default)]
    pub target: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct Manifest {
    pub viewport: Viewport,
    pub nodes: Vec<NodeDecl>,
    pub carousel: Option<CarouselDecl>,
    pub marquee: Option<MarqueeDecl>,
    pub reveals: Vec<RevealDecl>,
    pub interactions: Vec<InteractionDecl>,
    pub anchors: Vec<AnchorDecl>,
    pub scroller: ScrollerConfig,
}

impl Manifest {
    pub fn from_json(json: &str) -> KinemaResult<Self> {
        serde_json::from_str(json).map_err(|e| KinemaError::serde(format!("parse manifest: {e}")))
    }

    /// Structural validation: label uniqueness, reference resolution, and
    /// config sanity. Layout-dependent checks (step sizes, item counts) run
    /// again when the controllers mount.
    pub fn validate(&self) -> KinemaResult<()> {
        if !self.viewport.height.is_finite() || self.viewport.height <= 0.0 {
            return Err(KinemaError::validation(format!(
                "viewport height must be finite and positive, got {}",
                self.viewport.height
            )));
        }

        let mut labels = HashSet::new();
        for node in &self.nodes {
            if node.label.is_empty() {
                return Err(KinemaError::validation("node label must not be empty"));
            }
            if !labels.insert(node.label.as_str()) {
                return Err(KinemaError::validation(format!(
                    "duplicate node label '{}'",
                    node.label
                )));
            }
        }
        let known = |role: &str, label: &str| -> KinemaResult<()> {
            if labels.contains(label) {
                Ok(())
            } else {
                Err(KinemaError::validation(format!(
                    "{role} references unknown node '{label}'"
                )))
            }
        };

        if let Some(carousel) = &self.carousel {
            carousel.config.validate()?;
            known("carousel track", &carousel.track)?;
            let mut seen = HashSet::new();
            for item in &carousel.items {
                known("carousel item", item)?;
                if !seen.insert(item.as_str()) {
                    return Err(KinemaError::validation(format!(
                        "carousel item '{item}' listed twice"
                    )));
                }
            }
            if let Some(prev) = &carousel.prev {
                known("carousel prev control", prev)?;
            }
            if let Some(next) = &carousel.next {
                known("carousel next control", next)?;
            }
        }

        if let Some(marquee) = &self.marquee {
            marquee.config.validate()?;
            for row in &marquee.rows {
                known("marquee row", &row.row)?;
                for tag in &row.tags {
                    known("marquee tag", tag)?;
                }
            }
        }

        for (i, reveal) in self.reveals.iter().enumerate() {
            if reveal.targets.is_empty() {
                return Err(KinemaError::validation(format!(
                    "reveal {i} has no targets"
                )));
            }
            for target in &reveal.targets {
                known("reveal target", target)?;
            }
            if let TriggerDecl::OnScroll { watch, .. } = &reveal.trigger {
                known("reveal watch", watch)?;
            }
        }

        for interaction in &self.interactions {
            known("interaction", &interaction.node)?;
            if !interaction.hover && interaction.press.is_none() {
                return Err(KinemaError::validation(format!(
                    "interaction on '{}' enables neither hover nor press",
                    interaction.node
                )));
            }
        }

        let mut hrefs = HashSet::new();
        for anchor in &self.anchors {
            if anchor.href.is_empty() {
                return Err(KinemaError::validation("anchor href must not be empty"));
            }
            if !hrefs.insert(anchor.href.as_str()) {
                return Err(KinemaError::validation(format!(
                    "duplicate anchor href '{}'",
                    anchor.href
                )));
            }
            if let Some(target) = &anchor.target {
                known("anchor target", target)?;
            }
        }

        self.scroller.validate()?;
        Ok(())
    }
}
