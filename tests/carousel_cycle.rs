use kinema::{Carousel, CarouselConfig, Channel, Metrics, Stage};

const WIDTH: f64 = 300.0;
const GAP: f64 = 24.0;
const STEP: f64 = WIDTH + GAP;

fn rig(n: usize) -> (Stage, Carousel) {
    let mut stage = Stage::new();
    let track = stage.insert("track");
    stage.set_metrics(track, Metrics { gap: GAP, ..Metrics::default() });
    let items: Vec<_> = (0..n)
        .map(|i| {
            let id = stage.insert(format!("card-{i}"));
            stage.set_metrics(id, Metrics { width: WIDTH, ..Metrics::default() });
            id
        })
        .collect();
    let carousel = Carousel::mount(&mut stage, track, &items, CarouselConfig::default()).unwrap();
    (stage, carousel)
}

fn opacities(stage: &Stage, carousel: &Carousel) -> Vec<f64> {
    carousel
        .items()
        .iter()
        .map(|&id| stage.channel(id, Channel::Opacity))
        .collect()
}

/// Click, then wait out the slide. Steps are spaced past the debounce and
/// the animation mutex so every click is accepted.
fn step(stage: &mut Stage, carousel: &mut Carousel, t: &mut f64, forward: bool) {
    *t += 800.0;
    let accepted = if forward {
        carousel.next(stage, *t).unwrap()
    } else {
        carousel.prev(stage, *t).unwrap()
    };
    assert!(accepted);
    *t += 700.0;
    carousel.tick(stage, *t).unwrap();
    assert!(!carousel.is_animating());
}

#[test]
fn a_full_lap_forward_returns_home() {
    let (mut stage, mut carousel) = rig(6);
    let home = carousel.logical_left();
    let seeded = opacities(&stage, &carousel);

    let mut t = 0.0;
    for _ in 0..6 {
        step(&mut stage, &mut carousel, &mut t, true);
    }

    assert_eq!(carousel.logical_left(), home);
    assert_eq!(opacities(&stage, &carousel), seeded);
    let x = stage.channel(carousel.track(), Channel::TranslateX);
    assert_eq!(x, -(STEP * carousel.index() as f64).round());
}

#[test]
fn a_full_lap_backward_returns_home() {
    let (mut stage, mut carousel) = rig(7);
    let home = carousel.logical_left();
    let seeded = opacities(&stage, &carousel);

    let mut t = 0.0;
    for _ in 0..7 {
        step(&mut stage, &mut carousel, &mut t, false);
    }

    assert_eq!(carousel.logical_left(), home);
    assert_eq!(opacities(&stage, &carousel), seeded);
    let x = stage.channel(carousel.track(), Channel::TranslateX);
    assert_eq!(x, -(STEP * carousel.index() as f64).round());
}

#[test]
fn zigzag_walks_cancel_out() {
    let (mut stage, mut carousel) = rig(6);
    let home = carousel.logical_left();
    let seeded = opacities(&stage, &carousel);

    let mut t = 0.0;
    for forward in [true, false, false, true, true, false] {
        step(&mut stage, &mut carousel, &mut t, forward);
    }

    assert_eq!(carousel.logical_left(), home);
    assert_eq!(opacities(&stage, &carousel), seeded);
}
