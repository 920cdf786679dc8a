use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use inspections::layout;
use inspections::reports::FacadeCondition;
use inspections::{samples, InspectionError, Photo, Report, ReportKind};
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use report_pdf::html::HtmlRenderer;
use report_pdf::model::Block;
use report_pdf::Letterhead;

fn section_titles(report: &Report) -> Vec<String> {
    report
        .document(Some("sample"))
        .expect("document")
        .sections()
        .iter()
        .map(|section| section.title().to_string())
        .collect()
}

#[test]
fn every_sample_validates_and_lays_out() {
    for report in samples::all() {
        report
            .validate()
            .unwrap_or_else(|err| panic!("{} sample invalid: {err}", report.kind()));
        let document = report.document(Some("sample")).expect("document");

        assert_eq!(document.title(), report.kind().title());
        assert_eq!(document.reference(), Some("Report sample"));
        let sections = document.sections();
        assert_eq!(sections[0].title(), "Project Information");

        let photos = sections.last().expect("photos section");
        assert_eq!(photos.title(), "Photographs");
        assert!(matches!(photos.blocks().first(), Some(Block::PageBreak)));
        let images = photos
            .blocks()
            .iter()
            .filter(|block| matches!(block, Block::Image(_)))
            .count();
        assert_eq!(images, report.photos().len());
    }
}

#[test]
fn samples_survive_a_json_round_trip() {
    for report in samples::all() {
        let json = report.to_json().expect("serialize");
        let parsed = Report::from_json(report.kind(), json).expect("parse");
        assert_eq!(parsed, report);
    }
}

#[test]
fn parapet_layout_sections_are_in_order() {
    let titles = section_titles(&samples::sample(ReportKind::Parapet));
    assert_eq!(
        titles,
        vec![
            "Project Information",
            "Parapet",
            "Condition Checklist",
            "Remarks",
            "Photographs",
        ]
    );
}

#[test]
fn daily_field_has_no_remarks_section_when_blank() {
    let titles = section_titles(&samples::sample(ReportKind::DailyField));
    assert!(!titles.iter().any(|title| title == "Remarks"));
    assert!(titles.iter().any(|title| title == "Manpower"));
}

#[test]
fn derived_values_match_the_samples() {
    match samples::sample(ReportKind::Concrete) {
        Report::Concrete(concrete) => assert_eq!(concrete.total_yards(), 27.5),
        other => panic!("unexpected kind {}", other.kind()),
    }
    match samples::sample(ReportKind::Facade) {
        Report::Facade(facade) => {
            assert_eq!(facade.overall_condition(), Some(FacadeCondition::SafeWithRepair))
        }
        other => panic!("unexpected kind {}", other.kind()),
    }
    match samples::sample(ReportKind::Firestopping) {
        Report::Firestopping(firestopping) => assert_eq!(firestopping.failed_count(), 1),
        other => panic!("unexpected kind {}", other.kind()),
    }
}

#[test]
fn broken_photo_fails_with_its_number() {
    let mut report = samples::sample(ReportKind::Insulation);
    if let Report::Insulation(insulation) = &mut report {
        insulation.photos.push(Photo::new("data:image/png;base64,%%%", "Broken"));
    }

    match report.document(None) {
        Err(InspectionError::PhotoDecode { index, .. }) => assert_eq!(index, 2),
        other => panic!("unexpected result: {other:?}"),
    }
}

#[test]
fn nonconformance_needs_a_description() {
    let mut report = samples::sample(ReportKind::SpecialInspection);
    if let Report::SpecialInspection(special) = &mut report {
        special.nonconformance_description.clear();
    }
    let err = report.validate().unwrap_err();
    assert_eq!(err.problems().len(), 1);
}

#[test]
fn samples_render_to_html() {
    let renderer = HtmlRenderer::new().with_letterhead(Letterhead::default());
    for report in samples::all() {
        let document = report.document(Some("sample")).expect("document");
        let html = renderer.render(&document).expect("html");
        assert!(html.contains("Building Inspection Services"));
        assert!(html.contains("data:image/png;base64,"));
        assert!(html.contains(&layout::photo_caption(1, &report.photos()[0])));
    }
}

proptest! {
    #[test]
    fn photo_payloads_decode_in_both_encodings(bytes in proptest::collection::vec(any::<u8>(), 1..256)) {
        let encoded = STANDARD.encode(&bytes);
        prop_assert_eq!(Photo::new(encoded.clone(), "").decode(1).unwrap(), bytes.clone());
        let url = format!("data:image/jpeg;base64,{}", encoded);
        prop_assert_eq!(Photo::new(url, "").decode(1).unwrap(), bytes);
    }
}
