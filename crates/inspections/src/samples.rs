//! One realistic record per report kind, used for demos and rendering tests.

use std::io::Cursor;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use chrono::NaiveDate;
use image::{DynamicImage, ImageBuffer, ImageOutputFormat, ImageResult, Rgb};
use log::warn;

use crate::common::{Answer, ChecklistItem, Photo, ProjectInfo};
use crate::kind::ReportKind;
use crate::report::Report;
use crate::reports::*;

const PHOTO_WIDTH: u32 = 480;
const PHOTO_HEIGHT: u32 = 320;

/// Renders a diagonal gradient PNG standing in for a site photo.
pub fn placeholder_photo(start: [u8; 3], end: [u8; 3]) -> ImageResult<Vec<u8>> {
    let width = PHOTO_WIDTH as f32;
    let height = PHOTO_HEIGHT as f32;
    let buffer = ImageBuffer::from_fn(PHOTO_WIDTH, PHOTO_HEIGHT, |x, y| {
        let mix = (0.65 * x as f32 / width + 0.35 * y as f32 / height).clamp(0.0, 1.0);
        let mut channels = [0u8; 3];
        for (index, channel) in channels.iter_mut().enumerate() {
            let from = start[index] as f32;
            let to = end[index] as f32;
            *channel = (from + (to - from) * mix).round().clamp(0.0, 255.0) as u8;
        }
        Rgb(channels)
    });

    let mut bytes = Vec::new();
    DynamicImage::ImageRgb8(buffer).write_to(&mut Cursor::new(&mut bytes), ImageOutputFormat::Png)?;
    Ok(bytes)
}

fn photos(captions: &[&str]) -> Vec<Photo> {
    const PALETTE: [([u8; 3], [u8; 3]); 3] = [
        ([120, 132, 148], [210, 214, 220]),
        ([150, 120, 96], [226, 208, 182]),
        ([84, 110, 92], [196, 214, 186]),
    ];

    captions
        .iter()
        .zip(PALETTE.iter().cycle())
        .filter_map(|(caption, (start, end))| match placeholder_photo(*start, *end) {
            Ok(bytes) => Some(Photo::new(
                format!("data:image/png;base64,{}", STANDARD.encode(bytes)),
                *caption,
            )),
            Err(err) => {
                warn!("Sample photo '{}' could not be generated: {}", caption, err);
                None
            }
        })
        .collect()
}

fn project(name: &str, date: (i32, u32, u32)) -> ProjectInfo {
    ProjectInfo {
        client: "Harbor Point Development LLC".to_string(),
        project_name: name.to_string(),
        project_address: "1200 Harbor Point Blvd, Baltimore, MD 21231".to_string(),
        project_number: Some("HP-2024-017".to_string()),
        permit_number: Some("B-24-00871".to_string()),
        inspector: "Jordan Rivera".to_string(),
        inspection_date: NaiveDate::from_ymd_opt(date.0, date.1, date.2).unwrap_or_default(),
        weather: Some("Partly cloudy".to_string()),
        temperature: Some("64 °F".to_string()),
    }
}

fn yes() -> ChecklistItem {
    ChecklistItem::answered(Answer::Yes)
}

fn no(detail: &str) -> ChecklistItem {
    ChecklistItem::answered(Answer::No).with_detail(detail)
}

fn not_applicable() -> ChecklistItem {
    ChecklistItem::answered(Answer::NotApplicable)
}

/// Sample record for `kind`.
pub fn sample(kind: ReportKind) -> Report {
    match kind {
        ReportKind::AirBalancing => Report::AirBalancing(AirBalancingReport {
            project: project("Harbor Point Tower", (2024, 5, 14)),
            system_name: "Supply Air - Floors 3-5".to_string(),
            unit_tag: "AHU-2".to_string(),
            readings: vec![
                AirReading {
                    location: "Room 301".to_string(),
                    outlet_type: "Ceiling diffuser".to_string(),
                    size: "12x12".to_string(),
                    design_cfm: 250.0,
                    actual_cfm: 238.0,
                },
                AirReading {
                    location: "Room 302".to_string(),
                    outlet_type: "Ceiling diffuser".to_string(),
                    size: "10x10".to_string(),
                    design_cfm: 180.0,
                    actual_cfm: 196.0,
                },
                AirReading {
                    location: "Corridor 3A".to_string(),
                    outlet_type: "Linear slot".to_string(),
                    size: "48x2".to_string(),
                    design_cfm: 300.0,
                    actual_cfm: 262.0,
                },
            ],
            dampers_adjusted: yes(),
            filters_clean: yes(),
            belts_tensioned: not_applicable(),
            fan_rotation_correct: yes(),
            remarks: "Corridor 3A is 13% below design; damper to be rebalanced after ceiling close-in."
                .to_string(),
            photos: photos(&["AHU-2 supply fan", "Corridor 3A linear diffuser"]),
        }),
        ReportKind::Concrete => Report::Concrete(ConcreteReport {
            project: project("Harbor Point Tower", (2024, 4, 22)),
            pour_location: "Level 4 slab, grids A-D / 1-5".to_string(),
            mix_design: "5000 psi, 3/4\" aggregate".to_string(),
            specified_strength_psi: Some(5000),
            slump_inches: Some(4.5),
            air_content_percent: Some(5.5),
            concrete_temperature_f: Some(68.0),
            cylinders_cast: Some(8),
            truck_tickets: vec![
                TruckTicket {
                    ticket_number: "778120".to_string(),
                    truck: "T-14".to_string(),
                    batch_time: "06:42".to_string(),
                    arrival_time: "07:15".to_string(),
                    cubic_yards: 10.0,
                },
                TruckTicket {
                    ticket_number: "778127".to_string(),
                    truck: "T-09".to_string(),
                    batch_time: "07:05".to_string(),
                    arrival_time: "07:41".to_string(),
                    cubic_yards: 10.0,
                },
                TruckTicket {
                    ticket_number: "778133".to_string(),
                    truck: "T-21".to_string(),
                    batch_time: "07:30".to_string(),
                    arrival_time: "08:02".to_string(),
                    cubic_yards: 7.5,
                },
            ],
            bar_size_and_spacing: yes(),
            clear_cover: no("Cover at grid C/3 measured 5/8\"; chairs added before placement."),
            lap_splices: yes(),
            supports_and_chairs: yes(),
            embeds_and_sleeves: yes(),
            forms_clean: yes(),
            remarks: "Placement proceeded after cover deficiency at C/3 was corrected.".to_string(),
            photos: photos(&["Top mat at grid C/3", "Slump test, truck T-14"]),
        }),
        ReportKind::Garage => Report::Garage(GarageReport {
            project: project("Harbor Point Garage", (2024, 3, 9)),
            level: "P2".to_string(),
            observations: vec![
                GarageObservation {
                    location: "Bay 14".to_string(),
                    element: "Slab soffit".to_string(),
                    condition: GarageCondition::Poor,
                    notes: "Spall 18\"x10\" with exposed bottom bars.".to_string(),
                },
                GarageObservation {
                    location: "Ramp P2-P3".to_string(),
                    element: "Expansion joint".to_string(),
                    condition: GarageCondition::Fair,
                    notes: "Seal debonded along 6 ft.".to_string(),
                },
                GarageObservation {
                    location: "Column C-7".to_string(),
                    element: "Column".to_string(),
                    condition: GarageCondition::Good,
                    notes: String::new(),
                },
            ],
            cracking: no("Map cracking in drive aisle between bays 12-16."),
            spalling: no("See bay 14."),
            exposed_reinforcement: no("Bay 14 soffit."),
            ponding: yes(),
            expansion_joints: no("Ramp joint seal debonded."),
            traffic_membrane: ChecklistItem::default(),
            remarks: "Shore bay 14 until the soffit repair is complete.".to_string(),
            photos: photos(&["Bay 14 soffit spall", "Ramp expansion joint"]),
        }),
        ReportKind::Parapet => Report::Parapet(ParapetReport {
            project: project("Harbor Point Tower", (2024, 6, 3)),
            elevation: "North".to_string(),
            height_inches: Some(42.0),
            material: "Brick masonry with cast stone coping".to_string(),
            coping_secure: no("Two coping stones loose at northeast corner."),
            flashing_intact: yes(),
            mortar_joints: no("Open head joints along east half."),
            cracking_absent: yes(),
            anchorage: ChecklistItem::default(),
            sealant: yes(),
            repairs_required: true,
            safety_hazard: false,
            remarks: "Reset loose coping and repoint open joints.".to_string(),
            photos: photos(&["Northeast corner coping"]),
        }),
        ReportKind::Facade => Report::Facade(FacadeReport {
            project: project("Harbor Point Tower", (2024, 6, 3)),
            elevations: vec![
                FacadeElevation {
                    name: "North".to_string(),
                    material: "Brick masonry".to_string(),
                    condition: FacadeCondition::SafeWithRepair,
                    notes: "Cracked lintel above window 8N.".to_string(),
                },
                FacadeElevation {
                    name: "East".to_string(),
                    material: "Curtain wall".to_string(),
                    condition: FacadeCondition::Safe,
                    notes: String::new(),
                },
            ],
            windows: yes(),
            lintels: no("Lintel above 8N cracked and rusted."),
            balconies: not_applicable(),
            fire_escapes: not_applicable(),
            sealant_joints: yes(),
            appurtenances: yes(),
            remarks: "Replace lintel at 8N within the next cycle.".to_string(),
            photos: photos(&["Lintel above window 8N", "East curtain wall"]),
        }),
        ReportKind::Firestopping => Report::Firestopping(FirestoppingReport {
            project: project("Harbor Point Tower", (2024, 7, 18)),
            penetrations: vec![
                Penetration {
                    location: "Level 3 electrical room".to_string(),
                    penetration_type: "Cable bundle".to_string(),
                    ul_system: "W-L-3065".to_string(),
                    rating_hours: Some(2.0),
                    result: Some(Answer::Yes),
                },
                Penetration {
                    location: "Level 3 corridor".to_string(),
                    penetration_type: "Copper pipe".to_string(),
                    ul_system: "C-AJ-1080".to_string(),
                    rating_hours: Some(1.0),
                    result: Some(Answer::No),
                },
            ],
            listed_system_used: yes(),
            annular_space: no("Corridor pipe annular space exceeds listing."),
            sealant_depth: yes(),
            labeling: ChecklistItem::default(),
            remarks: "Corridor penetration to be reworked and reinspected.".to_string(),
            photos: photos(&["Corridor copper pipe penetration"]),
        }),
        ReportKind::Insulation => Report::Insulation(InsulationReport {
            project: project("Harbor Point Tower", (2024, 8, 6)),
            area: "Level 5 exterior walls".to_string(),
            insulation_type: "Mineral wool board".to_string(),
            specified_r_value: Some(15.0),
            measured_thickness_inches: Some(3.5),
            vapor_retarder: yes(),
            continuity: yes(),
            fastening: yes(),
            gaps_sealed: no("Gaps at two window jambs on the south wall."),
            remarks: String::new(),
            photos: photos(&["South wall window jamb"]),
        }),
        ReportKind::Structural => Report::Structural(StructuralReport {
            project: project("Harbor Point Tower", (2024, 2, 27)),
            elements: vec![
                StructuralElement {
                    grid_line: "B/4".to_string(),
                    member: "W18x35 beam".to_string(),
                    observation: "Shear tab bolts fully tensioned.".to_string(),
                    compliant: Some(Answer::Yes),
                },
                StructuralElement {
                    grid_line: "D/2".to_string(),
                    member: "HSS brace".to_string(),
                    observation: "Fillet weld undersized at gusset.".to_string(),
                    compliant: Some(Answer::No),
                },
            ],
            bolted_connections: yes(),
            welded_connections: no("Brace weld at D/2 undersized."),
            bracing: yes(),
            shoring: not_applicable(),
            deck_attachment: yes(),
            remarks: "Contractor to submit weld repair procedure for D/2.".to_string(),
            photos: photos(&["Brace gusset at D/2"]),
        }),
        ReportKind::DailyField => Report::DailyField(DailyFieldReport {
            project: project("Harbor Point Tower", (2024, 5, 2)),
            contractor: "Chesapeake Builders".to_string(),
            work_performed: "Erected level 6 steel between grids A-C. Placed level 4 topping slab."
                .to_string(),
            manpower: vec![
                Manpower {
                    trade: "Ironworkers".to_string(),
                    company: "Bayside Steel".to_string(),
                    headcount: 8,
                },
                Manpower {
                    trade: "Concrete".to_string(),
                    company: "Harbor Concrete".to_string(),
                    headcount: 6,
                },
                Manpower {
                    trade: "Laborers".to_string(),
                    company: "Chesapeake Builders".to_string(),
                    headcount: 4,
                },
            ],
            equipment: vec![
                "Tower crane".to_string(),
                "Concrete pump".to_string(),
                "Scissor lift (2)".to_string(),
            ],
            delays: "Crane stood down 45 minutes for wind.".to_string(),
            visitors: "Owner's representative, 10:00-11:30.".to_string(),
            safety_observations: "Guardrail missing at level 6 east edge; corrected same day."
                .to_string(),
            remarks: String::new(),
            photos: photos(&["Level 6 steel erection", "Level 4 topping placement"]),
        }),
        ReportKind::SpecialInspection => Report::SpecialInspection(SpecialInspectionReport {
            project: project("Harbor Point Tower", (2024, 4, 30)),
            code_reference: "IBC 2018 Chapter 17".to_string(),
            soils: false,
            concrete: true,
            masonry: false,
            structural_steel: true,
            wood: false,
            fireproofing: false,
            items: vec![
                SpecialInspectionItem {
                    description: "High-strength bolting, level 5 moment frames".to_string(),
                    drawing_reference: "S-501".to_string(),
                    result: Some(Answer::Yes),
                },
                SpecialInspectionItem {
                    description: "Anchor rods at grid F".to_string(),
                    drawing_reference: "S-101".to_string(),
                    result: Some(Answer::No),
                },
            ],
            nonconformance: true,
            nonconformance_description: "Anchor rod projection at F/3 short by 1/2\"; EOR notified."
                .to_string(),
            remarks: String::new(),
            photos: photos(&["Anchor rods at F/3"]),
        }),
    }
}

/// Sample records for every kind, in [`ReportKind::ALL`] order.
pub fn all() -> Vec<Report> {
    ReportKind::ALL.into_iter().map(sample).collect()
}
