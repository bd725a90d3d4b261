use kinema::{Manifest, Session};

#[test]
fn json_fixture_validates() {
    let s = include_str!("data/landing_page.json");
    let manifest: Manifest = serde_json::from_str(s).unwrap();
    manifest.validate().unwrap();
}

#[test]
fn json_fixture_mounts() {
    let s = include_str!("data/landing_page.json");
    let manifest: Manifest = serde_json::from_str(s).unwrap();
    let session = Session::build(&manifest, 0.0).unwrap();

    let carousel = session.carousel().unwrap();
    assert_eq!(carousel.index(), 4);
    assert_eq!(carousel.items().len(), 6 + 2 * 4);

    // Hero copy sits in its from-state until the load reveals arm.
    let title = session.node("hero-title").unwrap();
    assert_eq!(session.stage().style(title).opacity, 0.0);
    assert_eq!(session.stage().style(title).translate.y, 40.0);
}
