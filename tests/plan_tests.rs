use async_trait::async_trait;
use numerologija_server::forecast_catalog::{CatalogError, ForecastCatalog, ForecastImage};
use numerologija_server::numerology::triangles::{personality_numbers, relations_numbers};
use numerologija_server::numerology::BirthDate;
use numerologija_server::render_api::{LocalNumbers, Overlay, TriangleKind};
use numerologija_server::reports::plan::{
    child_plan, compatibility_plan, finances_plan, forecast_plan, personality_plan, SlideSpec,
};
use rand::rngs::StdRng;
use rand::SeedableRng;

fn date(s: &str) -> BirthDate {
    BirthDate::parse(s).unwrap()
}

fn static_paths(plan: &[SlideSpec]) -> Vec<&str> {
    plan.iter()
        .filter_map(|s| match s {
            SlideSpec::Static { path, .. } => Some(path.as_str()),
            _ => None,
        })
        .collect()
}

#[tokio::test]
async fn personality_plan_opens_with_intro_and_star() {
    let d = date("15.07.1990");
    let plan = personality_plan(d, &LocalNumbers).await;

    assert_eq!(
        plan[0],
        SlideSpec::Static {
            path: "personiba/main/P-Main-1.jpg".to_string(),
            optional: false
        }
    );
    assert!(matches!(
        &plan[3],
        SlideSpec::Overlay { overlay: Overlay::Star(_), .. }
    ));
}

#[tokio::test]
async fn personality_plan_walks_every_family_section() {
    let d = date("15.07.1990");
    let plan = personality_plan(d, &LocalNumbers).await;
    let paths = static_paths(&plan);

    for intro in [
        "personiba/personiba/personiba.jpg",
        "personiba/dzimta/dzimta.jpg",
        "personiba/finanses/finanses.jpg",
        "personiba/attiecibas/attiecibas.jpg",
        "personiba/veseliba/veseliba.jpg",
    ] {
        assert!(paths.contains(&intro), "missing section intro {intro}");
    }

    // July birth month page sits in the dzimta section
    assert!(paths.contains(&"personiba/menesi/7-julijs.jpg"));

    // one slide per deduplicated personality number
    for n in personality_numbers(d).ordered() {
        let expected = format!("personiba/personiba/P{n}.jpg");
        assert!(paths.iter().any(|p| *p == expected), "missing {expected}");
    }
}

#[tokio::test]
async fn personality_relations_slides_come_in_pairs_and_skip_low_indices() {
    let d = date("15.07.1990");
    let plan = personality_plan(d, &LocalNumbers).await;
    let paths = static_paths(&plan);

    for n in relations_numbers(d).ordered() {
        let plus = format!("personiba/attiecibas/ac{n}p.jpg");
        let minus = format!("personiba/attiecibas/ac{n}m.jpg");
        if n <= 2 {
            assert!(!paths.iter().any(|p| *p == plus), "index {n} should be skipped");
        } else {
            assert!(paths.iter().any(|p| *p == plus));
            assert!(paths.iter().any(|p| *p == minus));
        }
    }
}

#[test]
fn child_plan_marks_group_slides_optional() {
    let plan = child_plan(date("01.01.2000"));

    // fixed intro pages are required
    assert!(matches!(
        &plan[0],
        SlideSpec::Static { optional: false, .. }
    ));

    let optional: Vec<_> = plan
        .iter()
        .filter(|s| matches!(s, SlideSpec::Static { optional: true, .. }))
        .collect();
    // four optional slides per personality number group
    assert_eq!(
        optional.len(),
        personality_numbers(date("01.01.2000")).ordered().len() * 4
    );

    assert!(matches!(
        plan.last(),
        Some(SlideSpec::Static { optional: false, .. })
    ));
}

#[test]
fn child_plan_uses_child_overlays() {
    let plan = child_plan(date("01.01.2000"));
    assert!(plan.iter().any(|s| matches!(
        s,
        SlideSpec::Overlay { overlay: Overlay::ChildStar(_), .. }
    )));
    assert!(plan.iter().any(|s| matches!(
        s,
        SlideSpec::Overlay {
            overlay: Overlay::Triangle(TriangleKind::Berns, _),
            ..
        }
    )));
}

#[test]
fn finances_plan_ends_with_watermarked_sample() {
    let plan = finances_plan(date("15.07.1990"));
    assert!(matches!(
        plan.last(),
        Some(SlideSpec::Watermarked { text, .. }) if text == "PARAUGS"
    ));
    // finances index 1 has no slide
    assert!(!static_paths(&plan).contains(&"finanses/finanses/frc1.jpg"));
}

struct StubCatalog;

#[async_trait]
impl ForecastCatalog for StubCatalog {
    async fn gada_image(&self, gada_cipars: u32) -> Result<Option<String>, CatalogError> {
        Ok(Some(format!("https://img.example/gada/{gada_cipars}.jpg")))
    }

    async fn menesa_images(&self, menesa_cipars: u32) -> Result<Vec<ForecastImage>, CatalogError> {
        Ok(vec![
            ForecastImage {
                image_url: format!("https://img.example/menesa/{menesa_cipars}-1.1.jpg"),
                variant: "1.1".to_string(),
            },
            ForecastImage {
                image_url: format!("https://img.example/menesa/{menesa_cipars}-1.2.jpg"),
                variant: "1.2".to_string(),
            },
        ])
    }
}

#[tokio::test]
async fn forecast_plan_covers_all_twelve_months() {
    let mut rng = StdRng::seed_from_u64(42);
    let plan = forecast_plan(date("15.07.1990"), 2025, &StubCatalog, &mut rng)
        .await
        .unwrap();

    // star + year page + 2 slides per month
    assert_eq!(plan.len(), 2 + 12 * 2);
    assert!(matches!(
        &plan[0],
        SlideSpec::Overlay { overlay: Overlay::Star(_), .. }
    ));
    // gada cipars for 15.07.1990 in 2025: 15 + 7 + 9 = 31 -> 4
    assert!(matches!(
        &plan[1],
        SlideSpec::Remote { url, title: None } if url.ends_with("/gada/4.jpg")
    ));

    let titles: Vec<_> = plan
        .iter()
        .filter_map(|s| match s {
            SlideSpec::Remote { title: Some(t), .. } => Some(t.text.as_str()),
            _ => None,
        })
        .collect();
    assert!(titles.contains(&"JANVĀRIS"));
    assert!(titles.contains(&"DECEMBRIS"));
}

struct EmptyCatalog;

#[async_trait]
impl ForecastCatalog for EmptyCatalog {
    async fn gada_image(&self, _gada_cipars: u32) -> Result<Option<String>, CatalogError> {
        Ok(None)
    }

    async fn menesa_images(&self, _menesa_cipars: u32) -> Result<Vec<ForecastImage>, CatalogError> {
        Ok(Vec::new())
    }
}

#[tokio::test]
async fn forecast_plan_requires_the_year_slide() {
    let mut rng = StdRng::seed_from_u64(0);
    let err = forecast_plan(date("15.07.1990"), 2025, &EmptyCatalog, &mut rng)
        .await
        .unwrap_err();
    assert!(err.to_string().contains("forecast_gada_images"));
}

#[tokio::test]
async fn compatibility_plan_shape() {
    let you = date("29.12.1999");
    let partner = date("28.11.1998");
    let plan = compatibility_plan(you, partner, &LocalNumbers).await;

    let compat_stars = plan
        .iter()
        .filter(|s| matches!(s, SlideSpec::Overlay { overlay: Overlay::CompatStar(_), .. }))
        .count();
    assert_eq!(compat_stars, 2);

    assert!(plan.iter().any(|s| matches!(
        s,
        SlideSpec::Overlay { overlay: Overlay::CompatSumStar(_, _), .. }
    )));

    // the four sum-driven sections close the report
    let tail = static_paths(&plan[plan.len() - 4..]);
    assert!(tail[0].starts_with("saderiba/saderiba/sac"));
    assert!(tail[1].starts_with("saderiba/stridi/stc"));
    assert!(tail[2].starts_with("saderiba/bizness/bc"));
    assert!(tail[3].starts_with("saderiba/rekomendacijas/rc"));
}
