//! Fixed slide scripts per report type.
//!
//! Each builder turns one or two birthdates into an ordered list of
//! `SlideSpec`s. The sequences are scripts, not configuration: page
//! order is part of the product and changing a walk order or a path
//! template changes the delivered PDF.

use crate::forecast_catalog::{choose_variant_group, ForecastCatalog};
use crate::numerology::triangles::{
    family_numbers, finances_numbers, health_numbers, mission_numbers, personality_numbers,
    Family,
};
use crate::numerology::{reduce22, reduce9, BirthDate};
use crate::pdf::{OverlayPlacement, Title};
use crate::render_api::{NumberSource, Overlay, TriangleKind};
use crate::reports::{
    clamp_relations_index, excluded_indices, gada_cipars, ReportError, MISSION_MIN_INDEX,
};
use rand::Rng;

/// One output page, declared before any fetch or drawing happens.
#[derive(Debug, Clone, PartialEq)]
pub enum SlideSpec {
    /// Storage asset stretched over the whole page.
    Static { path: String, optional: bool },
    /// Catalog image addressed by absolute URL, optional title on top.
    Remote { url: String, title: Option<Title> },
    /// Rendered overlay over an optional storage background.
    Overlay {
        overlay: Overlay,
        background: Option<String>,
        placement: OverlayPlacement,
        title: Option<Title>,
    },
    /// Storage asset with the sample watermark over it.
    Watermarked { path: String, text: String },
}

impl SlideSpec {
    fn fixed(path: String) -> Self {
        SlideSpec::Static {
            path,
            optional: false,
        }
    }

    fn optional(path: String) -> Self {
        SlideSpec::Static {
            path,
            optional: true,
        }
    }
}

/// Month page files under `personiba/menesi/`, indexed by month - 1.
const MONTH_FILES: [&str; 12] = [
    "1-janvaris",
    "2-februaris",
    "3-marts",
    "4-aprilis",
    "5-maijs",
    "6-junijs",
    "7-julijs",
    "8-augusts",
    "9-septembris",
    "10-oktobris",
    "11-novembris",
    "12-decembris",
];

/// Forecast month titles.
const MONTH_NAMES: [&str; 12] = [
    "JANVĀRIS",
    "FEBRUĀRIS",
    "MARTS",
    "APRĪLIS",
    "MAIJS",
    "JŪNIJS",
    "JŪLIJS",
    "AUGUSTS",
    "SEPTEMBRIS",
    "OKTOBRIS",
    "NOVEMBRIS",
    "DECEMBRIS",
];

const STAR_TITLE: &str = "Tava numeroloģiskā zvaigzne";

fn star_placement() -> OverlayPlacement {
    OverlayPlacement::Centered {
        max_w: 0.85,
        max_h: 0.85,
        x_shift: 0,
        y_shift: -20,
    }
}

fn triangle_placement() -> OverlayPlacement {
    OverlayPlacement::Centered {
        max_w: 0.85,
        max_h: 0.75,
        x_shift: 0,
        y_shift: 40,
    }
}

fn triangle_title(text: &str) -> Title {
    Title::new(text, 46.0, 120.0)
}

fn triangle_slide(kind: TriangleKind, date: BirthDate, title: &str) -> SlideSpec {
    SlideSpec::Overlay {
        overlay: Overlay::Triangle(kind, date),
        background: None,
        placement: triangle_placement(),
        title: Some(triangle_title(title)),
    }
}

/// Personality analysis: all five six-position families plus mission.
pub async fn personality_plan(
    date: BirthDate,
    numbers: &dyn NumberSource,
) -> Vec<SlideSpec> {
    let mut plan = Vec::new();

    for i in 1..=3 {
        plan.push(SlideSpec::fixed(format!("personiba/main/P-Main-{i}.jpg")));
    }
    plan.push(SlideSpec::Overlay {
        overlay: Overlay::Star(date),
        background: None,
        placement: star_placement(),
        title: Some(Title::new(STAR_TITLE, 38.0, 80.0)),
    });

    // Personality triangle section
    plan.push(SlideSpec::fixed("personiba/personiba/personiba.jpg".into()));
    plan.push(triangle_slide(
        TriangleKind::Personiba,
        date,
        "PERSONĪBA\nTRIJSTŪRIS",
    ));
    for n in personality_numbers(date).ordered() {
        plan.push(SlideSpec::fixed(format!("personiba/personiba/P{n}.jpg")));
    }

    // Family section, with the birth-month page in the middle
    plan.push(SlideSpec::fixed("personiba/dzimta/dzimta.jpg".into()));
    plan.push(triangle_slide(
        TriangleKind::Dzimta,
        date,
        "DZIMTA UN GARĪGUMS\nTRIJSTŪRIS",
    ));
    plan.push(SlideSpec::fixed(format!(
        "personiba/menesi/{}.jpg",
        MONTH_FILES[(date.month - 1) as usize]
    )));
    for n in family_numbers(date).ordered() {
        plan.push(SlideSpec::fixed(format!("personiba/dzimta/dzc{n}.jpg")));
    }

    // Finances section
    plan.push(SlideSpec::fixed("personiba/finanses/finanses.jpg".into()));
    plan.push(triangle_slide(
        TriangleKind::Finanses,
        date,
        "FINANSES UN REALIZĀCIJA\nTRIJSTŪRIS",
    ));
    for n in finances_numbers(date).ordered() {
        if excluded_indices(Family::Finances).contains(&n) {
            continue;
        }
        plan.push(SlideSpec::fixed(format!("personiba/finanses/frc{n}.jpg")));
    }

    // Relations section: numbers must match the rendered overlay, so they
    // come from the number source (remote JSON with local fallback)
    plan.push(SlideSpec::fixed(
        "personiba/attiecibas/attiecibas.jpg".into(),
    ));
    plan.push(triangle_slide(
        TriangleKind::Attiecibas,
        date,
        "ATTIECĪBAS\nTRIJSTŪRIS",
    ));
    for n in numbers.relations(date).await.ordered() {
        if excluded_indices(Family::Relations).contains(&n) {
            continue;
        }
        plan.push(SlideSpec::fixed(format!("personiba/attiecibas/ac{n}p.jpg")));
        plan.push(SlideSpec::fixed(format!("personiba/attiecibas/ac{n}m.jpg")));
    }

    // Health section
    plan.push(SlideSpec::fixed("personiba/veseliba/veseliba.jpg".into()));
    plan.push(triangle_slide(
        TriangleKind::Veseliba,
        date,
        "VESELĪBA\nTRIJSTŪRIS",
    ));
    for n in health_numbers(date).ordered() {
        plan.push(SlideSpec::fixed(format!("personiba/veseliba/vc{n}.jpg")));
    }

    // Mission: the rendered circles page, then one slide per number.
    // The three numbers may repeat and are not deduplicated.
    plan.push(SlideSpec::Overlay {
        overlay: Overlay::Mission(date),
        background: None,
        placement: OverlayPlacement::FullBleed,
        title: None,
    });
    let mission = mission_numbers(date);
    for n in [mission.first, mission.second, mission.third] {
        if n < MISSION_MIN_INDEX {
            continue;
        }
        plan.push(SlideSpec::fixed(format!("personiba/misija/mc{n}.jpg")));
    }

    plan
}

/// Child personality analysis: personality numbers drive groups of up to
/// four slides each; missing group files are declared optional.
pub fn child_plan(date: BirthDate) -> Vec<SlideSpec> {
    let mut plan = vec![
        SlideSpec::fixed("berns/main/1-berna_main.jpg".into()),
        SlideSpec::fixed("berns/main/2-berna_main2.jpg".into()),
        SlideSpec::Overlay {
            overlay: Overlay::ChildStar(date),
            background: Some("berns/main/3-berna_zvaigzne.jpg".into()),
            placement: OverlayPlacement::Centered {
                max_w: 0.72,
                max_h: 0.72,
                x_shift: 0,
                y_shift: 54, // 5% of the page height below center
            },
            title: None,
        },
        SlideSpec::Overlay {
            overlay: Overlay::Triangle(TriangleKind::Berns, date),
            background: Some("berns/main/4-berna_trissturis.jpg".into()),
            placement: OverlayPlacement::RelativeBox {
                x: 0.003,
                y: 0.11,
                w: 0.44,
                h: 0.72,
            },
            title: None,
        },
    ];

    for n in personality_numbers(date).ordered() {
        plan.push(SlideSpec::optional(format!("berns/group/{n}/c{n}.jpg")));
        for k in 1..=3 {
            plan.push(SlideSpec::optional(format!("berns/group/{n}/c{n}_{k}.jpg")));
        }
    }

    plan.push(SlideSpec::fixed("berns/main/berna_last.jpg".into()));
    plan
}

/// Finances and realization guide.
pub fn finances_plan(date: BirthDate) -> Vec<SlideSpec> {
    let mut plan = Vec::new();
    for i in 1..=3 {
        plan.push(SlideSpec::fixed(format!("finanses/main/{i}.jpg")));
    }
    plan.push(SlideSpec::Overlay {
        overlay: Overlay::Star(date),
        background: None,
        placement: star_placement(),
        title: Some(Title::new(STAR_TITLE, 38.0, 80.0)),
    });
    plan.push(SlideSpec::fixed(format!(
        "finanses/dzimta/dzc{}.jpg",
        date.day_reduced()
    )));
    plan.push(triangle_slide(
        TriangleKind::Finanses,
        date,
        "FINANSES UN REALIZĀCIJA\nTRIJSTŪRIS",
    ));
    plan.push(SlideSpec::fixed("finanses/main/trisstura_apraksts.jpg".into()));
    for n in finances_numbers(date).ordered() {
        if excluded_indices(Family::Finances).contains(&n) {
            continue;
        }
        plan.push(SlideSpec::fixed(format!("finanses/finanses/frc{n}.jpg")));
    }
    plan.push(SlideSpec::Watermarked {
        path: "finanses/main/last.jpg".into(),
        text: "PARAUGS".into(),
    });
    plan
}

/// Annual forecast: star page, year-number page from the catalog, then
/// one variant group of slides per month.
pub async fn forecast_plan<R: Rng>(
    date: BirthDate,
    target_year: u32,
    catalog: &dyn ForecastCatalog,
    rng: &mut R,
) -> Result<Vec<SlideSpec>, ReportError> {
    let mut plan = vec![SlideSpec::Overlay {
        overlay: Overlay::Star(date),
        background: None,
        placement: OverlayPlacement::Centered {
            max_w: 0.85,
            max_h: 0.85,
            x_shift: 0,
            y_shift: 0,
        },
        title: Some(Title::new(STAR_TITLE, 40.0, 70.0)),
    }];

    let gada = gada_cipars(date, target_year);
    log::info!("forecast {}: gada cipars {}", target_year, gada);
    let gada_url = catalog
        .gada_image(gada)
        .await?
        .ok_or_else(|| ReportError::MissingAsset(format!("forecast_gada_images[{gada}]")))?;
    plan.push(SlideSpec::Remote {
        url: gada_url,
        title: None,
    });

    for month in 1..=12u32 {
        let menesa = reduce22(gada + month);
        let rows = catalog.menesa_images(menesa).await?;
        if rows.is_empty() {
            log::warn!("no forecast slides for menesa cipars {}", menesa);
            continue;
        }
        let group = choose_variant_group(rows, rng);
        log::debug!(
            "forecast month {}: cipars {}, {} slides",
            month,
            menesa,
            group.len()
        );
        for row in group {
            plan.push(SlideSpec::Remote {
                url: row.image_url,
                title: Some(Title::new(MONTH_NAMES[(month - 1) as usize], 40.0, 70.0)),
            });
        }
    }

    Ok(plan)
}

fn compat_star_slide(date: BirthDate, title: &str) -> SlideSpec {
    SlideSpec::Overlay {
        overlay: Overlay::CompatStar(date),
        background: Some("saderiba/saderiba_main/3.jpg".into()),
        placement: OverlayPlacement::Centered {
            max_w: 0.78,
            max_h: 0.78,
            x_shift: 0,
            y_shift: 0,
        },
        title: Some(Title::new(title, 42.0, 70.0)),
    }
}

fn compat_triangle_slot() -> OverlayPlacement {
    OverlayPlacement::Slot {
        x: 80,
        y: 250,
        w: 650,
    }
}

/// Compatibility analysis for two birthdates.
pub async fn compatibility_plan(
    you: BirthDate,
    partner: BirthDate,
    numbers: &dyn NumberSource,
) -> Vec<SlideSpec> {
    let mut plan = vec![
        SlideSpec::fixed("saderiba/saderiba_main/1.jpg".into()),
        SlideSpec::fixed("saderiba/saderiba_main/2.jpg".into()),
        compat_star_slide(you, "TAVA ZVAIGZNE"),
        compat_star_slide(partner, "PARTNERA ZVAIGZNE"),
    ];

    // Your triangle in the slot of the ac background picked by your top
    // number; two description slides follow.
    let top_you = clamp_relations_index(reduce22(numbers.compatibility(you).await.top));
    plan.push(SlideSpec::Overlay {
        overlay: Overlay::Triangle(TriangleKind::Saderiba, you),
        background: Some(format!("saderiba/attiecibas/ac{top_you}.jpg")),
        placement: compat_triangle_slot(),
        title: None,
    });
    for suffix in ["_1", "_2"] {
        plan.push(SlideSpec::fixed(format!(
            "saderiba/attiecibas/ac{top_you}{suffix}.jpg"
        )));
    }

    let top_partner = clamp_relations_index(reduce22(numbers.compatibility(partner).await.top));
    plan.push(SlideSpec::Overlay {
        overlay: Overlay::Triangle(TriangleKind::Saderiba, partner),
        background: Some(format!("saderiba/attiecibas/ac{top_partner}p.jpg")),
        placement: compat_triangle_slot(),
        title: None,
    });
    for suffix in ["_1", "_2"] {
        plan.push(SlideSpec::fixed(format!(
            "saderiba/attiecibas/ac{top_partner}{suffix}.jpg"
        )));
    }

    // Combined star and the four sum-driven slides
    plan.push(SlideSpec::Overlay {
        overlay: Overlay::CompatSumStar(you, partner),
        background: Some("saderiba/saderiba_main/4-sad_zv.jpg".into()),
        placement: OverlayPlacement::Centered {
            max_w: 0.50,
            max_h: 0.50,
            x_shift: -555,
            y_shift: 10,
        },
        title: None,
    });

    let sum = numbers.star_sum(you, partner).await;
    plan.push(SlideSpec::fixed(format!(
        "saderiba/saderiba/sac{}.jpg",
        reduce22(sum.ml)
    )));
    plan.push(SlideSpec::fixed(format!(
        "saderiba/stridi/stc{}.jpg",
        reduce22(sum.top)
    )));
    plan.push(SlideSpec::fixed(format!(
        "saderiba/bizness/bc{}.jpg",
        reduce22(sum.mr)
    )));
    plan.push(SlideSpec::fixed(format!(
        "saderiba/rekomendacijas/rc{}.jpg",
        reduce9(sum.br)
    )));

    plan
}
