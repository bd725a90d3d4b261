//! Auto-scrolling tag ribbon: rows of tags drifting sideways at constant
//! speed, wrapping seamlessly after one original-set width.

use crate::{
    error::{KinemaError, KinemaResult},
    stage::{Channel, NodeId, Stage},
};

/// Drift direction of one row. Forward rows travel rightwards (+x).
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Direction {
    Forward,
    Reverse,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct MarqueeConfig {
    /// Drift speed in pixels per second (the production build moved a tenth
    /// of a pixel per 60 fps frame).
    pub speed_px_per_s: f64,
    /// Gap added after each tag when a row's own gap metric is zero.
    pub gap_px: f64,
    /// Extra copies of each row's tags, so the painted strip outruns the
    /// viewport while the offset wraps.
    pub duplicates: usize,
    /// Rows drifting opposite to the rest. The middle row of three by default.
    pub reversed: Vec<usize>,
}

impl Default for MarqueeConfig {
    fn default() -> Self {
        Self {
            speed_px_per_s: 6.0,
            gap_px: 15.0,
            duplicates: 5,
            reversed: vec![1],
        }
    }
}

impl MarqueeConfig {
    pub fn validate(&self) -> KinemaResult<()> {
        if !self.speed_px_per_s.is_finite() || self.speed_px_per_s < 0.0 {
            return Err(KinemaError::validation(format!(
                "marquee speed must be finite and non-negative, got {}",
                self.speed_px_per_s
            )));
        }
        if !self.gap_px.is_finite() || self.gap_px < 0.0 {
            return Err(KinemaError::validation(format!(
                "marquee gap must be finite and non-negative, got {}",
                self.gap_px
            )));
        }
        Ok(())
    }
}

#[derive(Debug)]
struct Row {
    node: NodeId,
    tags: Vec<NodeId>,
    direction: Direction,
    offset: f64,
    /// Set once the row has measurable tags; forward rows are seated at
    /// `-loop_width` at that moment.
    armed: bool,
}

/// Constant-velocity looping rows. Integrates `speed * dt` per tick and
/// writes each row's `translate.x` directly; no tween tasks involved.
#[derive(Debug)]
pub struct Marquee {
    rows: Vec<Row>,
    config: MarqueeConfig,
    last_tick: Option<f64>,
}

impl Marquee {
    /// One `(row node, original tags)` pair per row. Tags are cloned
    /// `duplicates` times onto the stage so the host has a full strip to
    /// paint; only the originals count toward the loop width.
    pub fn mount(
        stage: &mut Stage,
        rows: &[(NodeId, Vec<NodeId>)],
        config: MarqueeConfig,
    ) -> KinemaResult<Self> {
        config.validate()?;
        let mut built = Vec::with_capacity(rows.len());
        for (i, (node, tags)) in rows.iter().enumerate() {
            if tags.is_empty() {
                return Err(KinemaError::validation(format!(
                    "marquee row {i} has no tags"
                )));
            }
            if !stage.contains(*node) {
                return Err(KinemaError::stage(format!(
                    "marquee row {i} node does not exist"
                )));
            }
            for &tag in tags {
                if !stage.contains(tag) {
                    return Err(KinemaError::stage(format!(
                        "marquee row {i} references a missing tag node"
                    )));
                }
            }
            for _ in 0..config.duplicates {
                for &tag in tags {
                    stage.clone_node(tag);
                }
            }
            let direction = if config.reversed.contains(&i) {
                Direction::Reverse
            } else {
                Direction::Forward
            };
            built.push(Row {
                node: *node,
                tags: tags.clone(),
                direction,
                offset: 0.0,
                armed: false,
            });
        }
        tracing::debug!(rows = built.len(), "marquee mounted");
        Ok(Self {
            rows: built,
            config,
            last_tick: None,
        })
    }

    pub fn rows(&self) -> usize {
        self.rows.len()
    }

    pub fn direction(&self, row: usize) -> Option<Direction> {
        self.rows.get(row).map(|r| r.direction)
    }

    /// One original tag set's width: Σ(tag width + gap). The row's own gap
    /// metric wins over the configured default when present. Zero until the
    /// tags have measured widths.
    pub fn loop_width(&self, stage: &Stage, row: usize) -> f64 {
        let Some(row) = self.rows.get(row) else {
            return 0.0;
        };
        let tag_width: f64 = row.tags.iter().map(|&tag| stage.metrics(tag).width).sum();
        if tag_width <= 0.0 {
            return 0.0;
        }
        let row_gap = stage.metrics(row.node).gap;
        let gap = if row_gap > 0.0 { row_gap } else { self.config.gap_px };
        tag_width + gap * row.tags.len() as f64
    }

    /// Advance every armed row by `speed * dt` and wrap. Rows with no
    /// measurable width yet stay parked at zero.
    pub fn tick(&mut self, stage: &mut Stage, now: f64) {
        let dt_ms = match self.last_tick {
            Some(last) => (now - last).max(0.0),
            None => 0.0,
        };
        self.last_tick = Some(now);
        let travel = self.config.speed_px_per_s * dt_ms / 1000.0;

        for i in 0..self.rows.len() {
            let width = self.loop_width(stage, i);
            let row = &mut self.rows[i];
            if !width.is_finite() || width <= 0.0 {
                continue;
            }
            if !row.armed {
                row.armed = true;
                row.offset = match row.direction {
                    Direction::Forward => -width,
                    Direction::Reverse => 0.0,
                };
            }
            match row.direction {
                Direction::Forward => {
                    row.offset += travel;
                    if row.offset >= 0.0 {
                        row.offset = -width;
                    }
                }
                Direction::Reverse => {
                    row.offset -= travel;
                    if row.offset <= -width {
                        row.offset = 0.0;
                    }
                }
            }
            stage.set_channel(row.node, Channel::TranslateX, row.offset);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stage::Metrics;

    fn rig(rows: usize, tags_per_row: usize) -> (Stage, Marquee) {
        let mut stage = Stage::new();
        let mut specs = Vec::new();
        for r in 0..rows {
            let node = stage.insert(format!("row-{r}"));
            let tags: Vec<NodeId> = (0..tags_per_row)
                .map(|t| {
                    let id = stage.insert(format!("tag-{r}-{t}"));
                    stage.set_metrics(id, Metrics { width: 85.0, top: 0.0, gap: 0.0 });
                    id
                })
                .collect();
            specs.push((node, tags));
        }
        let marquee = Marquee::mount(&mut stage, &specs, MarqueeConfig::default()).unwrap();
        (stage, marquee)
    }

    #[test]
    fn middle_row_of_three_runs_reversed() {
        let (_, m) = rig(3, 4);
        assert_eq!(m.direction(0), Some(Direction::Forward));
        assert_eq!(m.direction(1), Some(Direction::Reverse));
        assert_eq!(m.direction(2), Some(Direction::Forward));
    }

    #[test]
    fn loop_width_counts_originals_plus_gap() {
        let (stage, m) = rig(1, 4);
        // 4 tags × (85 + default 15 gap)
        assert_eq!(m.loop_width(&stage, 0), 400.0);
    }

    #[test]
    fn row_gap_metric_overrides_default() {
        let (mut stage, m) = rig(1, 4);
        let row = stage.ids().next().unwrap();
        stage.set_metrics(row, Metrics { width: 0.0, top: 0.0, gap: 10.0 });
        assert_eq!(m.loop_width(&stage, 0), 380.0);
    }

    #[test]
    fn offsets_wrap_within_one_loop() {
        let (mut stage, mut m) = rig(3, 2);
        let width = m.loop_width(&stage, 0);
        let forward = stage.ids().next().unwrap();

        // 6 px/s for 300 s covers several laps of a 200 px loop.
        let mut t = 0.0;
        let mut prev_forward = None::<f64>;
        while t <= 300_000.0 {
            m.tick(&mut stage, t);
            let x = stage.channel(forward, Channel::TranslateX);
            assert!((-width..=0.0).contains(&x), "offset {x} escaped at {t}");
            if let Some(prev) = prev_forward {
                // Between wraps a forward row only moves rightwards.
                assert!(x >= prev || x == -width);
            }
            prev_forward = Some(x);
            t += 100.0;
        }
    }

    #[test]
    fn reversed_row_drifts_negative() {
        let (mut stage, mut m) = rig(3, 2);
        let reversed = m.rows[1].node;
        m.tick(&mut stage, 0.0);
        let first = stage.channel(reversed, Channel::TranslateX);
        assert_eq!(first, 0.0);
        m.tick(&mut stage, 1000.0);
        let later = stage.channel(reversed, Channel::TranslateX);
        assert!(later < first);
        assert_eq!(later, -6.0);
    }

    #[test]
    fn unmeasured_rows_stay_parked() {
        let mut stage = Stage::new();
        let node = stage.insert("row");
        let tag = stage.insert("tag");
        let mut m =
            Marquee::mount(&mut stage, &[(node, vec![tag])], MarqueeConfig::default()).unwrap();

        m.tick(&mut stage, 0.0);
        m.tick(&mut stage, 5000.0);
        assert_eq!(stage.channel(node, Channel::TranslateX), 0.0);

        // Metrics arriving later arm the row at the loop seam.
        stage.set_metrics(tag, Metrics { width: 85.0, top: 0.0, gap: 0.0 });
        m.tick(&mut stage, 5100.0);
        let x = stage.channel(node, Channel::TranslateX);
        let width = m.loop_width(&stage, 0);
        assert!((x - (-width + 0.6)).abs() < 1e-9);
    }

    #[test]
    fn rejects_empty_rows() {
        let mut stage = Stage::new();
        let node = stage.insert("row");
        let err = Marquee::mount(&mut stage, &[(node, vec![])], MarqueeConfig::default())
            .unwrap_err();
        assert!(matches!(err, KinemaError::Validation(_)));
    }
}
