use std::f32::consts::TAU;

use carbon_dashboard::color::{generate_palette, lighten};
use carbon_dashboard::data::aggregate::hierarchy_counts;
use carbon_dashboard::data::model::ProjectTable;
use carbon_dashboard::data::schema::Field;
use eframe::egui::{self, Align2, Color32, FontId, Pos2, Sense, Shape, Stroke, Ui, Vec2};

use super::plot::no_data;

const SIZE: f32 = 340.0;
const HOLE: f32 = 0.18;

// ---------------------------------------------------------------------------
// Layout
// ---------------------------------------------------------------------------

/// One annular sector. Angles are fractions of a full turn in [0, 1].
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    pub path: Vec<String>,
    pub count: usize,
    pub start: f32,
    pub end: f32,
    /// Index of the top-level ancestor, for colouring.
    pub root: usize,
}

/// Lay out sorted leaf counts as rings: ring `d` holds one segment per
/// distinct path prefix of length `d + 1`. Children always sit inside
/// their parent's angle.
pub fn sunburst_layout(leaves: &[(Vec<String>, usize)]) -> Vec<Vec<Segment>> {
    let total: usize = leaves.iter().map(|(_, n)| n).sum();
    let depth = leaves.iter().map(|(path, _)| path.len()).max().unwrap_or(0);
    if total == 0 {
        return Vec::new();
    }

    let mut rings: Vec<Vec<Segment>> = vec![Vec::new(); depth];
    let mut offset = 0usize;
    for (path, n) in leaves {
        let start = offset as f32 / total as f32;
        offset += n;
        let end = offset as f32 / total as f32;

        for d in 0..path.len() {
            let prefix = &path[..=d];
            if let Some(last) = rings[d].last_mut().filter(|last| last.path == prefix) {
                last.count += n;
                last.end = end;
                continue;
            }
            // Ring 0 is filled first for every leaf, so its last segment is
            // this leaf's root.
            let root = if d == 0 {
                rings[0].len()
            } else {
                rings[0].len().saturating_sub(1)
            };
            rings[d].push(Segment {
                path: prefix.to_vec(),
                count: *n,
                start,
                end,
                root,
            });
        }
    }
    rings
}

/// The segment under a point given as (ring index, turn fraction).
pub fn segment_at(rings: &[Vec<Segment>], ring: usize, turn: f32) -> Option<&Segment> {
    rings
        .get(ring)?
        .iter()
        .find(|s| turn >= s.start && turn < s.end)
}

// ---------------------------------------------------------------------------
// Painting
// ---------------------------------------------------------------------------

/// Scope → Type and Registry → Scope → Type side by side.
pub fn sunbursts(ui: &mut Ui, table: &ProjectTable, indices: &[usize]) {
    ui.horizontal_top(|ui: &mut Ui| {
        ui.vertical(|ui: &mut Ui| {
            ui.heading("Scope → Type");
            sunburst(ui, &hierarchy_counts(table, indices, &[Field::Scope, Field::Type]));
        });
        ui.vertical(|ui: &mut Ui| {
            ui.heading("Registry → Scope → Type");
            sunburst(
                ui,
                &hierarchy_counts(
                    table,
                    indices,
                    &[Field::VoluntaryRegistry, Field::Scope, Field::Type],
                ),
            );
        });
    });
}

pub fn sunburst(ui: &mut Ui, leaves: &[(Vec<String>, usize)]) {
    let rings = sunburst_layout(leaves);
    if rings.is_empty() {
        no_data(ui);
        return;
    }

    let (response, painter) = ui.allocate_painter(Vec2::splat(SIZE), Sense::hover());
    let center = response.rect.center();
    let radius = SIZE / 2.0 - 4.0;
    let hole = radius * HOLE;
    let width = (radius - hole) / rings.len() as f32;
    let palette = generate_palette(rings[0].len());
    let stroke = Stroke::new(1.0, ui.visuals().panel_fill);

    for (d, ring) in rings.iter().enumerate() {
        let r0 = hole + d as f32 * width;
        let r1 = r0 + width;
        for segment in ring {
            let fill = lighten(palette[segment.root], 0.22 * d as f32);
            paint_sector(&painter, center, r0, r1, segment.start, segment.end, fill, stroke);

            if d == 0 && segment.end - segment.start > 0.06 {
                let mid = (segment.start + segment.end) / 2.0;
                painter.text(
                    polar(center, (r0 + r1) / 2.0, mid),
                    Align2::CENTER_CENTER,
                    &segment.path[0],
                    FontId::proportional(11.0),
                    Color32::BLACK,
                );
            }
        }
    }

    let total: usize = rings[0].iter().map(|s| s.count).sum();
    if let Some(pos) = response.hover_pos() {
        let offset = pos - center;
        let distance = offset.length();
        if distance >= hole && distance < radius {
            let ring = ((distance - hole) / width) as usize;
            let turn = (offset.y.atan2(offset.x) / TAU).rem_euclid(1.0);
            if let Some(segment) = segment_at(&rings, ring, turn) {
                let share = 100.0 * segment.count as f32 / total as f32;
                response.on_hover_text_at_pointer(format!(
                    "{}\n{} projects ({share:.1}%)",
                    segment.path.join(" / "),
                    segment.count
                ));
            }
        }
    }
}

fn polar(center: Pos2, r: f32, turn: f32) -> Pos2 {
    let angle = turn * TAU;
    center + Vec2::new(angle.cos(), angle.sin()) * r
}

/// Annular sector as a strip of convex quads.
#[allow(clippy::too_many_arguments)]
fn paint_sector(
    painter: &egui::Painter,
    center: Pos2,
    r0: f32,
    r1: f32,
    start: f32,
    end: f32,
    fill: Color32,
    stroke: Stroke,
) {
    let steps = (((end - start) * 96.0).ceil() as usize).max(1);
    for k in 0..steps {
        let a = start + (end - start) * k as f32 / steps as f32;
        let b = start + (end - start) * (k + 1) as f32 / steps as f32;
        painter.add(Shape::convex_polygon(
            vec![
                polar(center, r0, a),
                polar(center, r1, a),
                polar(center, r1, b),
                polar(center, r0, b),
            ],
            fill,
            Stroke::NONE,
        ));
    }
    // Outline only along the sector edges so the quads read as one shape.
    for turn in [start, end] {
        painter.line_segment([polar(center, r0, turn), polar(center, r1, turn)], stroke);
    }
}
