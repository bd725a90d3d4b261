#![forbid(unsafe_code)]

pub mod carousel;
pub mod ease;
pub mod error;
pub mod interact;
pub mod marquee;
pub mod model;
pub mod reveal;
pub mod scroll;
pub mod session;
pub mod stage;
pub mod timeline;
pub mod tween;

pub use carousel::{Carousel, CarouselConfig, GoMode};
pub use ease::Ease;
pub use error::{KinemaError, KinemaResult};
pub use interact::{HoverSpec, InteractionLayer, PulseSpec};
pub use kurbo::Vec2;
pub use marquee::{Direction, Marquee, MarqueeConfig};
pub use model::{Manifest, PressKind};
pub use reveal::{RevealFrom, RevealGroupSpec, RevealSet, RevealTrigger};
pub use scroll::{HeaderEdge, Scroller, ScrollerConfig};
pub use session::{Event, Script, Session, Snapshot, Trace, run_script};
pub use stage::{Channel, Metrics, NodeId, Stage, Style};
pub use timeline::{TaskId, Timeline, TweenSpec};
pub use tween::Tween;
