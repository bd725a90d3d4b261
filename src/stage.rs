use kurbo::Vec2;

/// Handle to a stage node. Ids are minted by [`Stage::insert`] /
/// [`Stage::clone_node`] and stay valid for the stage's lifetime (nodes are
/// never removed).
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct NodeId(pub u32);

/// One animatable scalar of one node, the unit of tween exclusivity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum Channel {
    TranslateX,
    TranslateY,
    ScaleX,
    ScaleY,
    Opacity,
}

impl Channel {
    /// The channel's value in the rest pose.
    pub fn rest(self) -> f64 {
        match self {
            Self::TranslateX | Self::TranslateY => 0.0,
            Self::ScaleX | Self::ScaleY | Self::Opacity => 1.0,
        }
    }
}

/// Writable style channels. Rest pose: no offset, unit scale, fully opaque.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct Style {
    pub translate: Vec2,
    pub scale: Vec2,
    pub opacity: f64,
}

impl Default for Style {
    fn default() -> Self {
        Self {
            translate: Vec2::ZERO,
            scale: Vec2::new(1.0, 1.0),
            opacity: 1.0,
        }
    }
}

/// Host-fed layout facts. The runtime never measures anything itself: width
/// and gap feed the carousel/marquee stride math, `top` (document-space y)
/// feeds scroll triggers.
#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct Metrics {
    pub width: f64,
    pub top: f64,
    pub gap: f64,
}

#[derive(Clone, Debug)]
struct NodeSlot {
    label: String,
    style: Style,
    metrics: Metrics,
    origin: Option<NodeId>,
}

/// Flat retained scene the controllers write into and the host paints from.
///
/// This is the crate's stand-in for a DOM: nodes carry styles the runtime
/// owns and metrics the host owns. `clone_node` is the primitive behind the
/// carousel's wraparound illusion; a clone shares its source's origin id
/// the way a cloned DOM element would share a `data-*` attribute.
#[derive(Debug, Default)]
pub struct Stage {
    nodes: Vec<NodeSlot>,
}

impl Stage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, label: impl Into<String>) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(NodeSlot {
            label: label.into(),
            style: Style::default(),
            metrics: Metrics::default(),
            origin: None,
        });
        id
    }

    /// Duplicate a node: same label, style, and metrics. The clone's origin
    /// points at the source's origin (cloning a clone still names the true
    /// original).
    pub fn clone_node(&mut self, src: NodeId) -> NodeId {
        let slot = self.slot(src).clone();
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(NodeSlot {
            origin: Some(self.origin(src)),
            ..slot
        });
        id
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, id: NodeId) -> bool {
        (id.0 as usize) < self.nodes.len()
    }

    pub fn ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        (0..self.nodes.len() as u32).map(NodeId)
    }

    /// The true original behind `id`: itself for originals, the cloned
    /// source for clones.
    pub fn origin(&self, id: NodeId) -> NodeId {
        self.slot(id).origin.unwrap_or(id)
    }

    pub fn is_clone(&self, id: NodeId) -> bool {
        self.slot(id).origin.is_some()
    }

    pub fn label(&self, id: NodeId) -> &str {
        &self.slot(id).label
    }

    pub fn style(&self, id: NodeId) -> Style {
        self.slot(id).style
    }

    pub fn metrics(&self, id: NodeId) -> Metrics {
        self.slot(id).metrics
    }

    pub fn set_metrics(&mut self, id: NodeId, metrics: Metrics) {
        self.slot_mut(id).metrics = metrics;
    }

    pub fn channel(&self, id: NodeId, ch: Channel) -> f64 {
        let s = self.slot(id).style;
        match ch {
            Channel::TranslateX => s.translate.x,
            Channel::TranslateY => s.translate.y,
            Channel::ScaleX => s.scale.x,
            Channel::ScaleY => s.scale.y,
            Channel::Opacity => s.opacity,
        }
    }

    pub fn set_channel(&mut self, id: NodeId, ch: Channel, value: f64) {
        let s = &mut self.slot_mut(id).style;
        match ch {
            Channel::TranslateX => s.translate.x = value,
            Channel::TranslateY => s.translate.y = value,
            Channel::ScaleX => s.scale.x = value,
            Channel::ScaleY => s.scale.y = value,
            Channel::Opacity => s.opacity = value,
        }
    }

    fn slot(&self, id: NodeId) -> &NodeSlot {
        &self.nodes[id.0 as usize]
    }

    fn slot_mut(&mut self, id: NodeId) -> &mut NodeSlot {
        &mut self.nodes[id.0 as usize]
    }
}
