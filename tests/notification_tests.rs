mod common;

use common::{dec, stored};
use pricewatch::services::notification::NotificationTemplates;

#[test]
fn subject_follows_hungarian_template() {
    let templates = NotificationTemplates::build("AWS Jysk árfigyelő").unwrap();
    let product = stored("https://x/p1", "10000", false);

    let email = templates
        .render_price_drop(&product, "NORDBY kanapé", dec("9000"))
        .unwrap();

    assert_eq!(
        email.subject,
        "AWS Jysk árfigyelő - A(z) NORDBY kanapé termék ára csökkent"
    );
}

#[test]
fn text_and_html_bodies_carry_the_same_facts() {
    let templates = NotificationTemplates::build("AWS Jysk árfigyelő").unwrap();
    let product = stored("https://x/p1?color=grey&size=3", "10000", false);

    let email = templates
        .render_price_drop(&product, "NORDBY kanapé", dec("9000"))
        .unwrap();

    assert_eq!(
        email.text_body,
        "A megfigyelt NORDBY kanapé termék (https://x/p1?color=grey&size=3) ára a beállított érték (10000 Ft) alá csökkent. Jelenlegi ára: 9000 Ft"
    );

    assert!(email.html_body.contains("AWS Jysk árfigyelő értesítés"));
    assert!(email.html_body.contains("NORDBY kanapé"));
    assert!(email.html_body.contains("(10000 Ft)"));
    assert!(email.html_body.contains("<b>9000 Ft</b>"));
    assert!(email.html_body.contains("Megnézem"));
}

#[test]
fn html_body_escapes_product_name() {
    let templates = NotificationTemplates::build("Árfigyelő").unwrap();
    let product = stored("https://x/p1", "100", false);

    let email = templates
        .render_price_drop(&product, "<script>alert(1)</script>", dec("50"))
        .unwrap();

    assert!(!email.html_body.contains("<script>"));
    assert!(email.html_body.contains("&lt;script&gt;"));
    // the plain parts are not HTML
    assert!(email.subject.contains("<script>"));
}
