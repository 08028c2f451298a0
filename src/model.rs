use std::collections::HashSet;

use crate::error::{Error, Result};
use crate::geometry::{POINTS_PER_INCH, Point, Viewport};
use crate::style::{self, TextStyle};

/// Padding between the figure edge and the plot area, in points.
const FIGURE_MARGIN: f32 = 10.8;

/// Physical figure size and the data range its plot area shows.
#[derive(Debug, Clone, PartialEq)]
pub struct Figure {
    pub width_in: f32,
    pub height_in: f32,
    pub x_range: (f32, f32),
    pub y_range: (f32, f32),
}

impl Figure {
    pub fn viewport(&self) -> Viewport {
        Viewport::new(
            self.width_in * POINTS_PER_INCH,
            self.height_in * POINTS_PER_INCH,
            FIGURE_MARGIN,
            self.x_range,
            self.y_range,
        )
    }
}

/// A named box on the diagram.
#[derive(Debug, Clone)]
pub struct Entity {
    pub name: String,
    pub center: Point,
    pub width: f32,
    pub height: f32,
    pub fill: String,
    pub body: EntityBody,
}

impl Entity {
    pub fn label(
        name: &str,
        center: Point,
        width: f32,
        height: f32,
        fill: &str,
        label: &str,
    ) -> Self {
        Self {
            name: name.to_string(),
            center,
            width,
            height,
            fill: fill.to_string(),
            body: EntityBody::Label(label.to_string()),
        }
    }

    pub fn table(name: &str, center: Point, width: f32, height: f32, table: Table) -> Self {
        Self {
            name: name.to_string(),
            center,
            width,
            height,
            fill: table.category.fill().to_string(),
            body: EntityBody::Table(table),
        }
    }

    pub fn left(&self) -> f32 {
        self.center.x - self.width / 2.0
    }

    pub fn right(&self) -> f32 {
        self.center.x + self.width / 2.0
    }

    pub fn top(&self) -> f32 {
        self.center.y + self.height / 2.0
    }

    pub fn bottom(&self) -> f32 {
        self.center.y - self.height / 2.0
    }
}

#[derive(Debug, Clone)]
pub enum EntityBody {
    /// Centered multi-line caption.
    Label(String),
    /// Database table card with a header bar and one row per column.
    Table(Table),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableCategory {
    Core,
    Auth,
    Audit,
}

impl TableCategory {
    pub fn fill(self) -> &'static str {
        match self {
            Self::Core => style::erd::CORE,
            Self::Auth => style::erd::AUTH,
            Self::Audit => style::erd::AUDIT,
        }
    }

    pub fn header(self) -> &'static str {
        match self {
            Self::Core => style::erd::CORE_HEADER,
            Self::Auth => style::erd::AUTH_HEADER,
            Self::Audit => style::erd::AUDIT_HEADER,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Table {
    pub title: String,
    pub category: TableCategory,
    pub columns: Vec<Column>,
}

impl Table {
    pub fn new(title: &str, category: TableCategory, columns: Vec<Column>) -> Self {
        Self {
            title: title.to_string(),
            category,
            columns,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ColumnKind {
    PrimaryKey,
    /// Target as `table.column`.
    ForeignKey(String),
    Unique,
    /// Table-level constraint, e.g. `UNIQUE(tenant_id, email)`.
    Constraint(String),
    Plain,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub kind: ColumnKind,
    pub data_type: String,
}

impl Column {
    pub fn new(name: &str, kind: ColumnKind, data_type: &str) -> Self {
        Self {
            name: name.to_string(),
            kind,
            data_type: data_type.to_string(),
        }
    }

    pub fn plain(name: &str, data_type: &str) -> Self {
        Self::new(name, ColumnKind::Plain, data_type)
    }

    pub fn primary_key(name: &str, data_type: &str) -> Self {
        Self::new(name, ColumnKind::PrimaryKey, data_type)
    }

    pub fn foreign_key(name: &str, target: &str, data_type: &str) -> Self {
        Self::new(name, ColumnKind::ForeignKey(target.to_string()), data_type)
    }

    pub fn constraint(expr: &str) -> Self {
        Self::new("", ColumnKind::Constraint(expr.to_string()), "CONSTRAINT")
    }

    /// Key annotation shown before the data type, if any.
    pub fn key_text(&self) -> Option<String> {
        match &self.kind {
            ColumnKind::PrimaryKey => Some("PK".to_string()),
            ColumnKind::ForeignKey(target) => Some(format!("FK → {target}")),
            ColumnKind::Unique => Some("UNIQUE".to_string()),
            ColumnKind::Constraint(expr) => Some(expr.clone()),
            ColumnKind::Plain => None,
        }
    }

    /// Right-hand text of a table row: the key annotation and the data type.
    pub fn type_text(&self) -> String {
        match (self.key_text(), self.data_type.is_empty()) {
            (Some(key), true) => key,
            (Some(key), false) => format!("{key} {}", self.data_type),
            (None, _) => self.data_type.clone(),
        }
    }

    pub fn glyph(&self) -> &'static str {
        match self.kind {
            ColumnKind::PrimaryKey => "🔑",
            ColumnKind::ForeignKey(_) => "🔗",
            ColumnKind::Constraint(_) => "⚡",
            ColumnKind::Unique | ColumnKind::Plain => "•",
        }
    }

    pub fn name_color(&self) -> &'static str {
        match self.kind {
            ColumnKind::PrimaryKey => style::erd::PRIMARY_KEY,
            ColumnKind::ForeignKey(_) => style::erd::FOREIGN_KEY,
            ColumnKind::Constraint(_) => style::erd::CONSTRAINT,
            ColumnKind::Unique | ColumnKind::Plain => style::BLACK,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
}

/// Connector endpoint: a side of a named entity plus a nudge in data units.
#[derive(Debug, Clone, PartialEq)]
pub struct Anchor {
    pub entity: String,
    pub side: Side,
    pub dx: f32,
    pub dy: f32,
}

impl Anchor {
    pub fn new(entity: &str, side: Side) -> Self {
        Self {
            entity: entity.to_string(),
            side,
            dx: 0.0,
            dy: 0.0,
        }
    }

    pub fn nudge(mut self, dx: f32, dy: f32) -> Self {
        self.dx += dx;
        self.dy += dy;
        self
    }

    /// Data-unit position on `entity`, which must be the anchored one.
    pub fn resolve(&self, entity: &Entity) -> Point {
        let x = match self.side {
            Side::Left => entity.left(),
            Side::Right => entity.right(),
        };
        Point::new(x + self.dx, entity.center.y + self.dy)
    }
}

/// Filled triangular head at the end of a connector. Sizes are in points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArrowHead {
    pub length: f32,
    pub half_width: f32,
}

impl ArrowHead {
    /// Head of `-|>` style arrows: both dimensions scale with `mutation`.
    pub fn scaled(length: f32, half_width: f32, mutation: f32) -> Self {
        Self {
            length: length * mutation,
            half_width: half_width * mutation,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ArrowStroke {
    pub color: String,
    pub width: f32,
    pub dashed: bool,
    pub alpha: f32,
    /// Arc bend as a fraction of the chord length. Zero draws a straight line.
    pub curvature: f32,
    pub head: ArrowHead,
}

#[derive(Debug, Clone)]
pub struct Connector {
    pub from: Anchor,
    pub to: Anchor,
    pub stroke: ArrowStroke,
    /// Texts placed relative to the chord midpoint; `position` is the offset.
    pub labels: Vec<Annotation>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HAlign {
    Left,
    Center,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VAlign {
    Top,
    Center,
}

/// Rounded frame drawn behind a text.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    /// Padding in multiples of the font size; also the corner radius.
    pub pad: f32,
    pub fill: String,
    pub edge: String,
    pub alpha: f32,
}

impl Frame {
    pub fn new(pad: f32, fill: &str, edge: &str) -> Self {
        Self {
            pad,
            fill: fill.to_string(),
            edge: edge.to_string(),
            alpha: 1.0,
        }
    }

    pub fn alpha(mut self, alpha: f32) -> Self {
        self.alpha = alpha;
        self
    }
}

/// Free text at a data-unit position.
#[derive(Debug, Clone)]
pub struct Annotation {
    pub text: String,
    pub position: Point,
    pub style: TextStyle,
    pub halign: HAlign,
    pub valign: VAlign,
    pub frame: Option<Frame>,
}

impl Annotation {
    pub fn centered(text: &str, position: Point, style: TextStyle) -> Self {
        Self {
            text: text.to_string(),
            position,
            style,
            halign: HAlign::Center,
            valign: VAlign::Center,
            frame: None,
        }
    }

    pub fn align(mut self, halign: HAlign, valign: VAlign) -> Self {
        self.halign = halign;
        self.valign = valign;
        self
    }

    pub fn framed(mut self, frame: Frame) -> Self {
        self.frame = Some(frame);
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LegendEntry {
    pub fill: String,
    pub label: String,
}

impl LegendEntry {
    pub fn new(fill: &str, label: &str) -> Self {
        Self {
            fill: fill.to_string(),
            label: label.to_string(),
        }
    }
}

/// Swatch legend whose bottom edge centers on `anchor`, a fraction of the
/// plot area.
#[derive(Debug, Clone)]
pub struct Legend {
    pub entries: Vec<LegendEntry>,
    pub columns: usize,
    pub anchor: (f32, f32),
    pub font_size: f32,
    pub frame_alpha: f32,
}

/// A complete layout table.
#[derive(Debug, Clone)]
pub struct Diagram {
    /// File stem of the exported images.
    pub name: String,
    pub figure: Figure,
    /// Text color of `EntityBody::Label` captions.
    pub label_color: String,
    pub entities: Vec<Entity>,
    pub connectors: Vec<Connector>,
    pub annotations: Vec<Annotation>,
    pub legend: Option<Legend>,
}

impl Diagram {
    pub fn entity(&self, name: &str) -> Option<&Entity> {
        self.entities.iter().find(|entity| entity.name == name)
    }

    /// Entity names referenced by connectors, in first-use order.
    pub fn referenced_entities(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.connectors
            .iter()
            .flat_map(|c| [c.from.entity.as_str(), c.to.entity.as_str()])
            .filter(|name| seen.insert(*name))
            .collect()
    }

    /// Checks that entity names are unique and that every connector endpoint
    /// names a declared entity.
    pub fn validate(&self) -> Result<()> {
        let mut declared = HashSet::new();
        for entity in &self.entities {
            if !declared.insert(entity.name.as_str()) {
                return Err(Error::DuplicateEntity {
                    diagram: self.name.clone(),
                    entity: entity.name.clone(),
                });
            }
        }

        if let Some(missing) = self
            .referenced_entities()
            .into_iter()
            .find(|name| !declared.contains(name))
        {
            return Err(Error::UnknownEntity {
                diagram: self.name.clone(),
                entity: missing.to_string(),
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stroke() -> ArrowStroke {
        ArrowStroke {
            color: style::BLACK.to_string(),
            width: 1.0,
            dashed: false,
            alpha: 1.0,
            curvature: 0.0,
            head: ArrowHead::scaled(0.4, 0.4, 20.0),
        }
    }

    fn diagram(connectors: Vec<Connector>) -> Diagram {
        Diagram {
            name: "test".to_string(),
            figure: Figure {
                width_in: 4.0,
                height_in: 3.0,
                x_range: (0.0, 4.0),
                y_range: (0.0, 3.0),
            },
            label_color: style::BLACK.to_string(),
            entities: vec![
                Entity::label("a", Point::new(1.0, 1.0), 1.0, 1.0, style::WHITE, "A"),
                Entity::label("b", Point::new(3.0, 1.0), 1.0, 1.0, style::WHITE, "B"),
            ],
            connectors,
            annotations: Vec::new(),
            legend: None,
        }
    }

    fn connect(from: &str, to: &str) -> Connector {
        Connector {
            from: Anchor::new(from, Side::Right),
            to: Anchor::new(to, Side::Left),
            stroke: stroke(),
            labels: Vec::new(),
        }
    }

    #[test]
    fn validate_accepts_known_names() {
        assert!(diagram(vec![connect("a", "b")]).validate().is_ok());
    }

    #[test]
    fn validate_rejects_misspelled_endpoint() {
        let err = diagram(vec![connect("a", "c")]).validate().unwrap_err();
        assert!(matches!(err, Error::UnknownEntity { ref entity, .. } if entity == "c"));
    }

    #[test]
    fn validate_rejects_duplicate_entities() {
        let mut d = diagram(Vec::new());
        d.entities.push(d.entities[0].clone());
        assert!(matches!(d.validate(), Err(Error::DuplicateEntity { .. })));
    }

    #[test]
    fn referenced_entities_are_deduplicated_in_order() {
        let d = diagram(vec![connect("b", "a"), connect("a", "b")]);
        assert_eq!(d.referenced_entities(), vec!["b", "a"]);
    }

    #[test]
    fn anchors_resolve_against_box_edges() {
        let d = diagram(Vec::new());
        let a = d.entity("a").unwrap();
        assert_eq!(Anchor::new("a", Side::Left).resolve(a), Point::new(0.5, 1.0));
        assert_eq!(
            Anchor::new("a", Side::Right).nudge(0.25, -0.5).resolve(a),
            Point::new(1.75, 0.5)
        );
    }

    #[test]
    fn column_type_text_combines_key_and_type() {
        assert_eq!(Column::primary_key("id", "UUID").type_text(), "PK UUID");
        assert_eq!(
            Column::foreign_key("tenant_id", "tenants.id", "UUID").type_text(),
            "FK → tenants.id UUID"
        );
        assert_eq!(Column::plain("name", "VARCHAR(255)").type_text(), "VARCHAR(255)");
        assert_eq!(
            Column::new("subdomain", ColumnKind::Unique, "").type_text(),
            "UNIQUE"
        );
    }

    #[test]
    fn constraint_rows_get_constraint_glyph() {
        let row = Column::constraint("UNIQUE(tenant_id, email)");
        assert_eq!(row.glyph(), "⚡");
        assert_eq!(row.name_color(), style::erd::CONSTRAINT);
        assert_eq!(row.type_text(), "UNIQUE(tenant_id, email) CONSTRAINT");
    }

    #[test]
    fn table_fill_follows_category() {
        let table = Table::new("audit_logs", TableCategory::Audit, Vec::new());
        let entity = Entity::table("audit_logs", Point::new(4.0, 5.0), 3.5, 2.5, table);
        assert_eq!(entity.fill, style::erd::AUDIT);
        assert_eq!(TableCategory::Audit.header(), style::erd::AUDIT_HEADER);
    }
}
