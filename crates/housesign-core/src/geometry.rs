//! Field geometry: document-space positions with view-space pointer math
//!
//! All persisted coordinates are document-space (unscaled page units).
//! Pointer events arrive in view-space (`document-space * scale`) and are
//! divided by the current scale before any field is mutated. Every
//! move/resize clamps the field fully inside the page.

use crate::error::SignError;
use crate::fields::{SigningField, DEFAULT_FIELD_HEIGHT, DEFAULT_FIELD_WIDTH, MAX_SIGNING_FIELDS};

/// Minimum field dimensions enforced during resize
pub const MIN_FIELD_WIDTH: f64 = 100.0;
pub const MIN_FIELD_HEIGHT: f64 = 40.0;

/// Page dimensions in document-space units
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageBounds {
    pub width: f64,
    pub height: f64,
}

impl PageBounds {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    pub fn letter() -> Self {
        Self {
            width: 612.0,
            height: 792.0,
        }
    }

    pub fn a4() -> Self {
        Self {
            width: 595.0,
            height: 842.0,
        }
    }

    /// Recover document-space page dimensions from view-space ones
    pub fn from_view(view_width: f64, view_height: f64, scale: f64) -> Self {
        Self {
            width: view_width / scale,
            height: view_height / scale,
        }
    }
}

/// Clamp a field origin so the rect stays fully on the page
fn clamp_origin(x: f64, y: f64, width: f64, height: f64, bounds: PageBounds) -> (f64, f64) {
    let max_x = (bounds.width - width).max(0.0);
    let max_y = (bounds.height - height).max(0.0);
    (x.clamp(0.0, max_x), y.clamp(0.0, max_y))
}

/// Create a field centered on a view-space drop point. The drop point and
/// page dimensions are view-space; the resulting field is document-space,
/// clamped into the page.
pub fn place_field(
    fields: &[SigningField],
    page: u32,
    drop_view: (f64, f64),
    scale: f64,
    page_view: (f64, f64),
) -> Result<SigningField, SignError> {
    if fields.len() >= MAX_SIGNING_FIELDS {
        return Err(SignError::FieldLimitReached);
    }
    let bounds = PageBounds::from_view(page_view.0, page_view.1, scale);
    let center_x = drop_view.0 / scale;
    let center_y = drop_view.1 / scale;
    let (x, y) = clamp_origin(
        center_x - DEFAULT_FIELD_WIDTH / 2.0,
        center_y - DEFAULT_FIELD_HEIGHT / 2.0,
        DEFAULT_FIELD_WIDTH,
        DEFAULT_FIELD_HEIGHT,
        bounds,
    );
    Ok(SigningField::new(page, x, y, DEFAULT_FIELD_WIDTH, DEFAULT_FIELD_HEIGHT))
}

/// Toolbar "Add Field" path: fixed position, default size, same cap.
pub fn add_field(fields: &[SigningField], page: u32) -> Result<SigningField, SignError> {
    if fields.len() >= MAX_SIGNING_FIELDS {
        return Err(SignError::FieldLimitReached);
    }
    Ok(SigningField::new(page, 100.0, 100.0, DEFAULT_FIELD_WIDTH, DEFAULT_FIELD_HEIGHT))
}

/// Move a field by a view-space pointer delta, clamped to page bounds.
pub fn move_field(field: &mut SigningField, delta_view: (f64, f64), scale: f64, bounds: PageBounds) {
    let new_x = field.x + delta_view.0 / scale;
    let new_y = field.y + delta_view.1 / scale;
    let (x, y) = clamp_origin(new_x, new_y, field.width, field.height, bounds);
    field.x = x;
    field.y = y;
}

/// Resize a field toward a view-space pointer position. Width and height
/// have enforced minimums and are capped so the field stays on the page.
pub fn resize_field(
    field: &mut SigningField,
    pointer_view: (f64, f64),
    scale: f64,
    bounds: PageBounds,
) {
    let width = ((pointer_view.0 - field.x * scale) / scale).max(MIN_FIELD_WIDTH);
    let height = ((pointer_view.1 - field.y * scale) / scale).max(MIN_FIELD_HEIGHT);
    field.width = width.min(bounds.width - field.x);
    field.height = height.min(bounds.height - field.y);
}

/// Pointer interaction state for one field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Interaction {
    Idle,
    /// The view-space offset between the grab point and the field origin,
    /// captured at pointer-down so the field does not jump under the cursor.
    Dragging { grab_x: f64, grab_y: f64 },
    Resizing,
}

/// Drives drag/resize for a single field. Every pointer-move while active
/// commits a fully clamped mutation; pointer-up only returns to idle, the
/// last committed position stands.
#[derive(Debug, Default)]
pub struct FieldInteraction {
    state: Option<Interaction>,
}

impl FieldInteraction {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> Interaction {
        self.state.unwrap_or(Interaction::Idle)
    }

    pub fn is_active(&self) -> bool {
        !matches!(self.state(), Interaction::Idle)
    }

    /// Pointer-down on the field body.
    pub fn begin_drag(&mut self, field: &SigningField, pointer_view: (f64, f64), scale: f64) {
        self.state = Some(Interaction::Dragging {
            grab_x: pointer_view.0 - field.x * scale,
            grab_y: pointer_view.1 - field.y * scale,
        });
    }

    /// Pointer-down on the resize handle.
    pub fn begin_resize(&mut self) {
        self.state = Some(Interaction::Resizing);
    }

    /// Pointer-move while dragging or resizing. A no-op when idle.
    pub fn pointer_move(
        &mut self,
        field: &mut SigningField,
        pointer_view: (f64, f64),
        scale: f64,
        bounds: PageBounds,
    ) {
        match self.state() {
            Interaction::Dragging { grab_x, grab_y } => {
                let delta_view = (
                    pointer_view.0 - grab_x - field.x * scale,
                    pointer_view.1 - grab_y - field.y * scale,
                );
                move_field(field, delta_view, scale, bounds);
            }
            Interaction::Resizing => resize_field(field, pointer_view, scale, bounds),
            Interaction::Idle => {}
        }
    }

    /// Pointer-up anywhere ends the interaction; there is no abort path.
    pub fn pointer_up(&mut self) {
        self.state = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_place_field_centers_on_drop_point() {
        // Drop at view (450, 300) at scale 1.5 on a 600x800 doc-space page:
        // center converts to (300, 200), so a 200x50 field lands at (200, 175).
        let field = place_field(&[], 1, (450.0, 300.0), 1.5, (900.0, 1200.0)).unwrap();
        assert_eq!(field.x, 200.0);
        assert_eq!(field.y, 175.0);
        assert_eq!(field.width, 200.0);
        assert_eq!(field.height, 50.0);
        assert_eq!(field.page, 1);
    }

    #[test]
    fn test_place_field_clamps_to_page() {
        // Drop in the far corner: the field cannot hang off the page
        let field = place_field(&[], 1, (600.0, 800.0), 1.0, (600.0, 800.0)).unwrap();
        assert_eq!(field.x, 400.0);
        assert_eq!(field.y, 750.0);
    }

    #[test]
    fn test_place_field_rejects_sixth_field() {
        let fields: Vec<SigningField> = (0..MAX_SIGNING_FIELDS)
            .map(|_| SigningField::new(1, 0.0, 0.0, 200.0, 50.0))
            .collect();
        let result = place_field(&fields, 1, (300.0, 300.0), 1.0, (600.0, 800.0));
        assert!(matches!(result, Err(SignError::FieldLimitReached)));
        assert_eq!(fields.len(), MAX_SIGNING_FIELDS);
    }

    #[test]
    fn test_add_field_uses_fixed_position() {
        let field = add_field(&[], 2).unwrap();
        assert_eq!((field.x, field.y), (100.0, 100.0));
        assert_eq!((field.width, field.height), (200.0, 50.0));
        assert_eq!(field.page, 2);
    }

    #[test]
    fn test_move_field_divides_delta_by_scale() {
        let mut field = SigningField::new(1, 100.0, 100.0, 200.0, 50.0);
        move_field(&mut field, (30.0, 60.0), 2.0, PageBounds::new(600.0, 800.0));
        assert_eq!(field.x, 115.0);
        assert_eq!(field.y, 130.0);
    }

    #[test]
    fn test_move_field_clamps_to_edges() {
        let bounds = PageBounds::new(600.0, 800.0);
        let mut field = SigningField::new(1, 100.0, 100.0, 200.0, 50.0);

        move_field(&mut field, (-1000.0, -1000.0), 1.0, bounds);
        assert_eq!((field.x, field.y), (0.0, 0.0));

        move_field(&mut field, (10_000.0, 10_000.0), 1.0, bounds);
        assert_eq!((field.x, field.y), (400.0, 750.0));
    }

    #[test]
    fn test_resize_field_enforces_minimums() {
        let bounds = PageBounds::new(600.0, 800.0);
        let mut field = SigningField::new(1, 100.0, 100.0, 200.0, 50.0);
        // Pointer pulled up-left past the origin
        resize_field(&mut field, (50.0, 50.0), 1.0, bounds);
        assert_eq!(field.width, MIN_FIELD_WIDTH);
        assert_eq!(field.height, MIN_FIELD_HEIGHT);
    }

    #[test]
    fn test_resize_field_caps_at_page_edge() {
        let bounds = PageBounds::new(600.0, 800.0);
        let mut field = SigningField::new(1, 400.0, 700.0, 150.0, 50.0);
        resize_field(&mut field, (5000.0, 5000.0), 1.0, bounds);
        assert_eq!(field.width, 200.0);
        assert_eq!(field.height, 100.0);
    }

    #[test]
    fn test_resize_field_respects_scale() {
        let bounds = PageBounds::new(600.0, 800.0);
        let mut field = SigningField::new(1, 100.0, 100.0, 200.0, 50.0);
        // Pointer at view (600, 400) at scale 2.0 -> doc-space (300, 200)
        resize_field(&mut field, (600.0, 400.0), 2.0, bounds);
        assert_eq!(field.width, 200.0);
        assert_eq!(field.height, 100.0);
    }

    #[test]
    fn test_interaction_drag_commits_every_move() {
        let bounds = PageBounds::new(600.0, 800.0);
        let mut field = SigningField::new(1, 100.0, 100.0, 200.0, 50.0);
        let mut interaction = FieldInteraction::new();

        // Grab the field 10px (view) inside its origin at scale 2.0
        interaction.begin_drag(&field, (210.0, 210.0), 2.0);
        assert!(interaction.is_active());

        interaction.pointer_move(&mut field, (310.0, 250.0), 2.0, bounds);
        assert_eq!((field.x, field.y), (150.0, 120.0));

        // Each move stands on its own; no rollback at pointer-up
        interaction.pointer_move(&mut field, (410.0, 290.0), 2.0, bounds);
        assert_eq!((field.x, field.y), (200.0, 140.0));

        interaction.pointer_up();
        assert!(!interaction.is_active());
        assert_eq!((field.x, field.y), (200.0, 140.0));
    }

    #[test]
    fn test_interaction_move_is_noop_when_idle() {
        let bounds = PageBounds::new(600.0, 800.0);
        let mut field = SigningField::new(1, 100.0, 100.0, 200.0, 50.0);
        let mut interaction = FieldInteraction::new();
        interaction.pointer_move(&mut field, (500.0, 500.0), 1.0, bounds);
        assert_eq!((field.x, field.y), (100.0, 100.0));
    }

    #[test]
    fn test_interaction_resize_path() {
        let bounds = PageBounds::new(600.0, 800.0);
        let mut field = SigningField::new(1, 100.0, 100.0, 200.0, 50.0);
        let mut interaction = FieldInteraction::new();

        interaction.begin_resize();
        interaction.pointer_move(&mut field, (350.0, 180.0), 1.0, bounds);
        assert_eq!(field.width, 250.0);
        assert_eq!(field.height, 80.0);
        interaction.pointer_up();
        assert_eq!(interaction.state(), Interaction::Idle);
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn page_bounds() -> impl Strategy<Value = PageBounds> {
        prop_oneof![
            Just(PageBounds::letter()),
            Just(PageBounds::a4()),
            (500.0f64..2000.0, 500.0f64..2000.0).prop_map(|(w, h)| PageBounds::new(w, h)),
        ]
    }

    fn scale() -> impl Strategy<Value = f64> {
        0.5f64..=2.0
    }

    #[derive(Debug, Clone)]
    enum GeomOp {
        Move(f64, f64),
        Resize(f64, f64),
    }

    fn geom_op() -> impl Strategy<Value = GeomOp> {
        prop_oneof![
            (-2000.0f64..2000.0, -2000.0f64..2000.0).prop_map(|(dx, dy)| GeomOp::Move(dx, dy)),
            (-500.0f64..4000.0, -500.0f64..4000.0).prop_map(|(px, py)| GeomOp::Resize(px, py)),
        ]
    }

    fn in_bounds(field: &SigningField, bounds: PageBounds) -> bool {
        field.x >= 0.0
            && field.y >= 0.0
            && field.x + field.width <= bounds.width + 1e-9
            && field.y + field.height <= bounds.height + 1e-9
    }

    proptest! {
        /// Property: any sequence of moves and resizes keeps the field
        /// fully on the page.
        #[test]
        fn field_stays_on_page(
            bounds in page_bounds(),
            s in scale(),
            ops in prop::collection::vec(geom_op(), 1..40),
        ) {
            let mut field = add_field(&[], 1).unwrap();
            // Starting position is itself clamped for small pages
            let (x, y) = (field.x, field.y);
            let (cx, cy) = super::clamp_origin(x, y, field.width, field.height, bounds);
            field.x = cx;
            field.y = cy;

            for op in ops {
                match op {
                    GeomOp::Move(dx, dy) => move_field(&mut field, (dx, dy), s, bounds),
                    GeomOp::Resize(px, py) => resize_field(&mut field, (px, py), s, bounds),
                }
                prop_assert!(
                    in_bounds(&field, bounds),
                    "field escaped page: ({}, {}) {}x{} on {}x{}",
                    field.x, field.y, field.width, field.height,
                    bounds.width, bounds.height
                );
            }
        }

        /// Property: placed fields are always inside the page, whatever the
        /// drop point.
        #[test]
        fn placed_field_is_in_bounds(
            bounds in page_bounds(),
            s in scale(),
            drop_x in -1000.0f64..4000.0,
            drop_y in -1000.0f64..4000.0,
        ) {
            let page_view = (bounds.width * s, bounds.height * s);
            let field = place_field(&[], 1, (drop_x, drop_y), s, page_view).unwrap();
            prop_assert!(in_bounds(&field, bounds));
        }

        /// Property: moving never changes the field's size.
        #[test]
        fn move_preserves_size(
            bounds in page_bounds(),
            s in scale(),
            dx in -2000.0f64..2000.0,
            dy in -2000.0f64..2000.0,
        ) {
            let mut field = add_field(&[], 1).unwrap();
            let (w, h) = (field.width, field.height);
            move_field(&mut field, (dx, dy), s, bounds);
            prop_assert_eq!(field.width, w);
            prop_assert_eq!(field.height, h);
        }
    }
}
