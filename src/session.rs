//! A page session: one stage plus every controller the manifest wires up.
//! The host feeds it input events and timestamped ticks and paints from the
//! stage; a scripted runner drives whole sessions headlessly for the CLI and
//! the end-to-end tests.

use std::collections::BTreeMap;

use crate::{
    carousel::Carousel,
    error::{KinemaError, KinemaResult},
    interact::{HoverSpec, InteractionLayer},
    marquee::Marquee,
    model::{Manifest, TriggerDecl},
    reveal::{RevealGroupSpec, RevealSet, RevealTrigger},
    scroll::Scroller,
    stage::{Metrics, NodeId, Stage},
};

/// Host input, labelled the way the manifest declares nodes. Pointer events
/// on undeclared nodes are ignored; metrics for undeclared nodes are errors.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    CarouselPrev,
    CarouselNext,
    Press { node: String },
    PointerEnter { node: String },
    PointerLeave { node: String },
    AnchorClick { href: String },
    Scroll { y: f64 },
    SetMetrics { node: String, metrics: Metrics },
    Resize,
}

#[derive(Debug)]
pub struct Session {
    stage: Stage,
    nodes: BTreeMap<String, NodeId>,
    carousel: Option<Carousel>,
    prev_ctl: Option<NodeId>,
    next_ctl: Option<NodeId>,
    marquee: Option<Marquee>,
    reveals: RevealSet,
    interactions: InteractionLayer,
    scroller: Scroller,
    anchors: BTreeMap<String, Option<NodeId>>,
    viewport_h: f64,
}

impl Session {
    /// Validate the manifest, build the stage, and mount every declared
    /// effect. Load-triggered reveals start counting from `now`.
    #[tracing::instrument(skip(manifest), fields(nodes = manifest.nodes.len()))]
    pub fn build(manifest: &Manifest, now: f64) -> KinemaResult<Self> {
        manifest.validate()?;

        let mut stage = Stage::new();
        let mut nodes = BTreeMap::new();
        for decl in &manifest.nodes {
            let id = stage.insert(decl.label.clone());
            stage.set_metrics(id, decl.metrics);
            nodes.insert(decl.label.clone(), id);
        }
        let resolve = |label: &str| -> KinemaResult<NodeId> {
            nodes.get(label).copied().ok_or_else(|| {
                KinemaError::validation(format!("unknown node label '{label}'"))
            })
        };

        let carousel = match &manifest.carousel {
            Some(decl) => {
                let track = resolve(&decl.track)?;
                let items = decl
                    .items
                    .iter()
                    .map(|label| resolve(label))
                    .collect::<KinemaResult<Vec<_>>>()?;
                Some(Carousel::mount(&mut stage, track, &items, decl.config)?)
            }
            None => None,
        };
        let prev_ctl = match &manifest.carousel {
            Some(decl) => decl.prev.as_deref().map(&resolve).transpose()?,
            None => None,
        };
        let next_ctl = match &manifest.carousel {
            Some(decl) => decl.next.as_deref().map(&resolve).transpose()?,
            None => None,
        };

        let marquee = match &manifest.marquee {
            Some(decl) => {
                let rows = decl
                    .rows
                    .iter()
                    .map(|row| {
                        let node = resolve(&row.row)?;
                        let tags = row
                            .tags
                            .iter()
                            .map(|tag| resolve(tag))
                            .collect::<KinemaResult<Vec<_>>>()?;
                        Ok((node, tags))
                    })
                    .collect::<KinemaResult<Vec<_>>>()?;
                Some(Marquee::mount(&mut stage, &rows, decl.config.clone())?)
            }
            None => None,
        };

        let reveal_specs = manifest
            .reveals
            .iter()
            .map(|decl| {
                let targets = decl
                    .targets
                    .iter()
                    .map(|label| resolve(label))
                    .collect::<KinemaResult<Vec<_>>>()?;
                let trigger = match &decl.trigger {
                    TriggerDecl::OnLoad { delay_ms } => RevealTrigger::OnLoad {
                        delay_ms: *delay_ms,
                    },
                    TriggerDecl::OnScroll { watch, viewport_fraction } => {
                        RevealTrigger::OnScroll {
                            watch: resolve(watch)?,
                            viewport_fraction: *viewport_fraction,
                        }
                    }
                };
                Ok(RevealGroupSpec {
                    targets,
                    from: decl.from,
                    tween: decl.tween,
                    stagger_ms: decl.stagger_ms,
                    trigger,
                })
            })
            .collect::<KinemaResult<Vec<_>>>()?;
        let reveals = RevealSet::mount(&mut stage, reveal_specs, now)?;

        let mut interactions = InteractionLayer::new();
        for decl in &manifest.interactions {
            let node = resolve(&decl.node)?;
            if decl.hover {
                interactions.register_hover(&stage, node, HoverSpec::default())?;
            }
            if let Some(kind) = decl.press {
                interactions.register_press(&stage, node, kind.spec())?;
            }
        }

        let scroller = Scroller::new(manifest.scroller)?;

        let anchors = manifest
            .anchors
            .iter()
            .map(|anchor| {
                let target = anchor.target.as_deref().map(&resolve).transpose()?;
                Ok((anchor.href.clone(), target))
            })
            .collect::<KinemaResult<BTreeMap<_, _>>>()?;

        tracing::debug!(
            carousel = carousel.is_some(),
            marquee = marquee.is_some(),
            reveals = manifest.reveals.len(),
            "session built"
        );
        Ok(Self {
            stage,
            nodes,
            carousel,
            prev_ctl,
            next_ctl,
            marquee,
            reveals,
            interactions,
            scroller,
            anchors,
            viewport_h: manifest.viewport.height,
        })
    }

    pub fn stage(&self) -> &Stage {
        &self.stage
    }

    pub fn node(&self, label: &str) -> Option<NodeId> {
        self.nodes.get(label).copied()
    }

    pub fn carousel(&self) -> Option<&Carousel> {
        self.carousel.as_ref()
    }

    pub fn scroll_y(&self) -> f64 {
        self.scroller.scroll_y()
    }

    pub fn header_scrolled(&self) -> bool {
        self.scroller.header_scrolled()
    }

    /// Route one host event. `now` is the event's own timestamp; it feeds the
    /// debounce and tween clocks.
    pub fn dispatch(&mut self, event: &Event, now: f64) -> KinemaResult<()> {
        match event {
            Event::CarouselPrev => {
                if let Some(carousel) = self.carousel.as_mut() {
                    carousel.prev(&mut self.stage, now)?;
                }
            }
            Event::CarouselNext => {
                if let Some(carousel) = self.carousel.as_mut() {
                    carousel.next(&mut self.stage, now)?;
                }
            }
            Event::Press { node } => {
                let Some(id) = self.node(node) else {
                    tracing::debug!(node = %node, "press on undeclared node ignored");
                    return Ok(());
                };
                if self.prev_ctl == Some(id) {
                    if let Some(carousel) = self.carousel.as_mut() {
                        carousel.prev(&mut self.stage, now)?;
                    }
                } else if self.next_ctl == Some(id) {
                    if let Some(carousel) = self.carousel.as_mut() {
                        carousel.next(&mut self.stage, now)?;
                    }
                } else {
                    self.interactions.press(&mut self.stage, id, now);
                }
            }
            Event::PointerEnter { node } => {
                if let Some(id) = self.node(node) {
                    self.interactions.pointer_enter(&mut self.stage, id, now);
                } else {
                    tracing::debug!(node = %node, "pointer enter on undeclared node ignored");
                }
            }
            Event::PointerLeave { node } => {
                if let Some(id) = self.node(node) {
                    self.interactions.pointer_leave(&mut self.stage, id, now);
                } else {
                    tracing::debug!(node = %node, "pointer leave on undeclared node ignored");
                }
            }
            Event::AnchorClick { href } => match self.anchors.get(href) {
                Some(target) => self.scroller.scroll_to_anchor(&self.stage, *target, now),
                None => tracing::debug!(href = %href, "undeclared anchor ignored"),
            },
            Event::Scroll { y } => {
                if let Some(edge) = self.scroller.set_scroll(*y) {
                    tracing::debug!(?edge, y, "header threshold crossed");
                }
                self.reveals
                    .observe_scroll(&mut self.stage, *y, self.viewport_h, now);
            }
            Event::SetMetrics { node, metrics } => {
                let Some(id) = self.node(node) else {
                    return Err(KinemaError::stage(format!(
                        "metrics for undeclared node '{node}'"
                    )));
                };
                self.stage.set_metrics(id, *metrics);
            }
            Event::Resize => {
                if let Some(carousel) = self.carousel.as_mut() {
                    carousel.resize(now);
                }
            }
        }
        Ok(())
    }

    /// Advance every controller to `now`. Scroll reveals also watch the
    /// scroller here, so glides can trigger them mid-flight.
    pub fn tick(&mut self, now: f64) -> KinemaResult<()> {
        if let Some(carousel) = self.carousel.as_mut() {
            carousel.tick(&mut self.stage, now)?;
        }
        if let Some(marquee) = self.marquee.as_mut() {
            marquee.tick(&mut self.stage, now);
        }
        self.reveals.tick(&mut self.stage, now);
        self.interactions.tick(&mut self.stage, now);
        if let Some(edge) = self.scroller.tick(now) {
            tracing::debug!(?edge, scroll_y = self.scroller.scroll_y(), "header threshold crossed");
        }
        self.reveals
            .observe_scroll(&mut self.stage, self.scroller.scroll_y(), self.viewport_h, now);
        Ok(())
    }

    /// Deterministic view of the declared nodes (clones excluded) plus the
    /// page scroll state.
    pub fn snapshot(&self, at_ms: f64) -> Snapshot {
        let nodes = self
            .nodes
            .iter()
            .map(|(label, &id)| {
                let style = self.stage.style(id);
                (
                    label.clone(),
                    NodeState {
                        x: style.translate.x,
                        y: style.translate.y,
                        scale_x: style.scale.x,
                        scale_y: style.scale.y,
                        opacity: style.opacity,
                    },
                )
            })
            .collect();
        Snapshot {
            at_ms,
            scroll_y: self.scroller.scroll_y(),
            header_scrolled: self.scroller.header_scrolled(),
            nodes,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct NodeState {
    pub x: f64,
    pub y: f64,
    pub scale_x: f64,
    pub scale_y: f64,
    pub opacity: f64,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct Snapshot {
    pub at_ms: f64,
    pub scroll_y: f64,
    pub header_scrolled: bool,
    pub nodes: BTreeMap<String, NodeState>,
}

/// A headless run: regular ticks plus timestamped events.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Script {
    pub until_ms: f64,
    pub tick_ms: f64,
    #[serde(default)]
    pub events: Vec<ScriptEvent>,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ScriptEvent {
    pub at_ms: f64,
    pub event: Event,
}

impl Script {
    pub fn from_json(json: &str) -> KinemaResult<Self> {
        serde_json::from_str(json).map_err(|e| KinemaError::serde(format!("parse script: {e}")))
    }

    pub fn validate(&self) -> KinemaResult<()> {
        if !self.tick_ms.is_finite() || self.tick_ms <= 0.0 {
            return Err(KinemaError::validation(format!(
                "script tick_ms must be finite and positive, got {}",
                self.tick_ms
            )));
        }
        if !self.until_ms.is_finite() || self.until_ms < 0.0 {
            return Err(KinemaError::validation(format!(
                "script until_ms must be finite and non-negative, got {}",
                self.until_ms
            )));
        }
        for event in &self.events {
            if !event.at_ms.is_finite() || event.at_ms < 0.0 {
                return Err(KinemaError::validation(format!(
                    "script event timestamp must be finite and non-negative, got {}",
                    event.at_ms
                )));
            }
        }
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct Trace {
    pub samples: Vec<Snapshot>,
}

/// Build a session at t=0 and drive it: events dispatch at their own
/// timestamps (in time order, declaration order on ties), a tick and a
/// snapshot follow at each multiple of `tick_ms` through `until_ms`.
#[tracing::instrument(skip(manifest, script))]
pub fn run_script(manifest: &Manifest, script: &Script) -> KinemaResult<Trace> {
    script.validate()?;
    let mut session = Session::build(manifest, 0.0)?;

    let mut ordered: Vec<&ScriptEvent> = script.events.iter().collect();
    ordered.sort_by(|a, b| a.at_ms.total_cmp(&b.at_ms));
    let mut pending = ordered.into_iter().peekable();

    let mut samples = Vec::new();
    let mut t = 0.0;
    while t <= script.until_ms {
        while pending.peek().is_some_and(|ev| ev.at_ms <= t) {
            if let Some(ev) = pending.next() {
                session.dispatch(&ev.event, ev.at_ms)?;
            }
        }
        session.tick(t)?;
        samples.push(session.snapshot(t));
        t += script.tick_ms;
    }
    Ok(Trace { samples })
}
