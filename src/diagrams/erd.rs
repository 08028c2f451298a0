use crate::geometry::Point;
use crate::model::{
    Anchor, Annotation, ArrowHead, ArrowStroke, Column, ColumnKind, Connector, Diagram, Entity,
    EntityBody, Figure, Frame, HAlign, Legend, LegendEntry, Side, Table, TableCategory, VAlign,
};
use crate::style::{self, TextStyle, erd as palette};

pub const NAME: &str = "database-erd";

const TABLE_WIDTH: f32 = 3.5;
/// Vertical nudge separating the two connectors that leave `tenants`
/// side by side.
const FAN_OUT: f32 = 0.5;

const TENANCY_NOTE: &str = "Multi-Tenancy Implementation:
• All tables (except super_admin) have tenant_id column
• Foreign keys cascade delete for data integrity
• Unique constraint: (tenant_id, email) in users table
• Indexes on all tenant_id columns for performance
• Super admin users have tenant_id = NULL";

fn created_updated() -> [Column; 2] {
    [
        Column::plain("created_at", "TIMESTAMP"),
        Column::plain("updated_at", "TIMESTAMP"),
    ]
}

fn tenants() -> Entity {
    let mut columns = vec![
        Column::primary_key("id", "UUID"),
        Column::plain("name", "VARCHAR(255)"),
        Column::new("subdomain", ColumnKind::Unique, "VARCHAR(100)"),
        Column::plain("status", "ENUM"),
        Column::plain("subscription_plan", "ENUM"),
        Column::plain("max_users", "INTEGER"),
        Column::plain("max_projects", "INTEGER"),
    ];
    columns.extend(created_updated());
    Entity::table(
        "tenants",
        Point::new(4.0, 9.0),
        TABLE_WIDTH,
        2.5,
        Table::new("tenants", TableCategory::Core, columns),
    )
}

fn users() -> Entity {
    let mut columns = vec![
        Column::primary_key("id", "UUID"),
        Column::foreign_key("tenant_id", "tenants.id", "UUID"),
        Column::plain("email", "VARCHAR(255)"),
        Column::plain("password_hash", "VARCHAR(255)"),
        Column::plain("full_name", "VARCHAR(255)"),
        Column::plain("role", "ENUM"),
        Column::plain("is_active", "BOOLEAN"),
    ];
    columns.extend(created_updated());
    columns.push(Column::constraint("UNIQUE(tenant_id, email)"));
    Entity::table(
        "users",
        Point::new(8.0, 9.0),
        TABLE_WIDTH,
        3.0,
        Table::new("users", TableCategory::Auth, columns),
    )
}

fn projects() -> Entity {
    let mut columns = vec![
        Column::primary_key("id", "UUID"),
        Column::foreign_key("tenant_id", "tenants.id", "UUID"),
        Column::plain("name", "VARCHAR(255)"),
        Column::plain("description", "TEXT"),
        Column::plain("status", "ENUM"),
        Column::foreign_key("created_by", "users.id", "UUID"),
    ];
    columns.extend(created_updated());
    Entity::table(
        "projects",
        Point::new(12.0, 9.0),
        TABLE_WIDTH,
        2.5,
        Table::new("projects", TableCategory::Core, columns),
    )
}

fn tasks() -> Entity {
    let mut columns = vec![
        Column::primary_key("id", "UUID"),
        Column::foreign_key("project_id", "projects.id", "UUID"),
        Column::foreign_key("tenant_id", "tenants.id", "UUID"),
        Column::plain("title", "VARCHAR(255)"),
        Column::plain("description", "TEXT"),
        Column::plain("status", "ENUM"),
        Column::plain("priority", "ENUM"),
        Column::foreign_key("assigned_to", "users.id", "UUID"),
        Column::plain("due_date", "DATE"),
    ];
    columns.extend(created_updated());
    Entity::table(
        "tasks",
        Point::new(8.0, 5.0),
        TABLE_WIDTH,
        3.0,
        Table::new("tasks", TableCategory::Core, columns),
    )
}

fn audit_logs() -> Entity {
    let columns = vec![
        Column::primary_key("id", "UUID"),
        Column::foreign_key("tenant_id", "tenants.id", "UUID"),
        Column::foreign_key("user_id", "users.id", "UUID"),
        Column::plain("action", "VARCHAR(100)"),
        Column::plain("entity_type", "VARCHAR(50)"),
        Column::plain("entity_id", "UUID"),
        Column::plain("ip_address", "VARCHAR(45)"),
        Column::plain("created_at", "TIMESTAMP"),
    ];
    Entity::table(
        "audit_logs",
        Point::new(4.0, 5.0),
        TABLE_WIDTH,
        2.5,
        Table::new("audit_logs", TableCategory::Audit, columns),
    )
}

/// One-to-many relationships as `(parent, child, foreign key column)`.
const RELATIONSHIPS: [(&str, &str, &str); 8] = [
    ("tenants", "users", "tenant_id"),
    ("tenants", "projects", "tenant_id"),
    ("tenants", "audit_logs", "tenant_id"),
    ("users", "projects", "created_by"),
    ("users", "tasks", "assigned_to"),
    ("users", "audit_logs", "user_id"),
    ("projects", "tasks", "project_id"),
    ("tenants", "tasks", "tenant_id"),
];

/// Connectors run from the parent's right edge to the child's left edge.
/// Audit targets are dashed.
fn relationship(entities: &[Entity], parent: &str, child: &str, fk_column: &str) -> Connector {
    let dy = match (parent, child) {
        ("tenants", "users") => -FAN_OUT,
        ("tenants", "projects") => FAN_OUT,
        _ => 0.0,
    };
    let dashed = entities
        .iter()
        .find(|e| e.name == child)
        .is_some_and(|e| {
            matches!(&e.body, EntityBody::Table(table) if table.category == TableCategory::Audit)
        });

    Connector {
        from: Anchor::new(parent, Side::Right).nudge(0.0, dy),
        to: Anchor::new(child, Side::Left).nudge(0.0, dy),
        stroke: ArrowStroke {
            color: palette::RELATION.to_string(),
            width: 1.5,
            dashed,
            alpha: 0.7,
            curvature: 0.1,
            head: ArrowHead::scaled(0.3, 0.3, 1.0),
        },
        labels: vec![
            Annotation::centered("1:N", Point::new(0.1, 0.1), TextStyle::new(8.0).bold())
                .framed(Frame::new(0.2, style::WHITE, style::BLACK).alpha(0.9)),
            Annotation::centered(
                fk_column,
                Point::new(0.0, -0.2),
                TextStyle::new(7.0).italic().color(palette::FOREIGN_KEY),
            ),
        ],
    }
}

pub fn diagram() -> Diagram {
    let entities = vec![tenants(), users(), projects(), tasks(), audit_logs()];

    let connectors = RELATIONSHIPS
        .iter()
        .map(|(parent, child, fk)| relationship(&entities, parent, child, fk))
        .collect();

    let annotations = vec![
        Annotation::centered(
            "Database Entity Relationship Diagram (ERD)",
            Point::new(8.0, 11.5),
            TextStyle::new(18.0).bold().color(palette::TITLE),
        ),
        Annotation::centered(
            "Multi-Tenant SaaS Platform - PostgreSQL Schema",
            Point::new(8.0, 11.0),
            TextStyle::new(12.0).color(palette::SUBTITLE),
        ),
        Annotation::centered(TENANCY_NOTE, Point::new(13.0, 3.0), TextStyle::new(9.0))
            .align(HAlign::Left, VAlign::Top)
            .framed(Frame::new(0.5, palette::NOTE_FILL, palette::NOTE_EDGE)),
    ];

    let legend = Legend {
        entries: vec![
            LegendEntry::new(palette::CORE, "Core Tables (Business Data)"),
            LegendEntry::new(palette::AUTH, "Authentication Tables"),
            LegendEntry::new(palette::AUDIT, "Audit Logging Tables"),
            LegendEntry::new(style::WHITE, "🔑 = Primary Key"),
            LegendEntry::new(style::WHITE, "🔗 = Foreign Key"),
            LegendEntry::new(style::WHITE, "⚡ = Constraint"),
        ],
        columns: 2,
        anchor: (0.5, 0.01),
        font_size: 9.0,
        frame_alpha: 0.9,
    };

    Diagram {
        name: NAME.to_string(),
        figure: Figure {
            width_in: 16.0,
            height_in: 12.0,
            x_range: (0.0, 16.0),
            y_range: (0.0, 12.0),
        },
        label_color: palette::TITLE.to_string(),
        entities,
        connectors,
        annotations,
        legend: Some(legend),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table<'a>(d: &'a Diagram, name: &str) -> &'a Table {
        match &d.entity(name).unwrap().body {
            EntityBody::Table(table) => table,
            EntityBody::Label(_) => panic!("{name} is not a table"),
        }
    }

    #[test]
    fn declares_five_tables_and_eight_relationships() {
        let d = diagram();
        assert_eq!(d.entities.len(), 5);
        assert_eq!(d.connectors.len(), 8);
        assert!(d.validate().is_ok());
    }

    #[test]
    fn only_audit_targets_are_dashed() {
        let d = diagram();
        for c in &d.connectors {
            assert_eq!(c.stroke.dashed, c.to.entity == "audit_logs", "{}", c.to.entity);
        }
    }

    #[test]
    fn tenants_fan_out_to_users_and_projects() {
        let d = diagram();
        let dy = |child: &str| {
            d.connectors
                .iter()
                .find(|c| c.from.entity == "tenants" && c.to.entity == child)
                .map(|c| (c.from.dy, c.to.dy))
                .unwrap()
        };
        assert_eq!(dy("users"), (-0.5, -0.5));
        assert_eq!(dy("projects"), (0.5, 0.5));
        assert_eq!(dy("tasks"), (0.0, 0.0));
    }

    #[test]
    fn foreign_keys_point_at_declared_tables() {
        let d = diagram();
        for entity in &d.entities {
            let EntityBody::Table(table) = &entity.body else {
                continue;
            };
            for column in &table.columns {
                if let ColumnKind::ForeignKey(target) = &column.kind {
                    let (target_table, _) = target.split_once('.').unwrap();
                    assert!(d.entity(target_table).is_some(), "{target}");
                }
            }
        }
    }

    #[test]
    fn users_table_ends_with_constraint_row() {
        let d = diagram();
        let users = table(&d, "users");
        assert_eq!(users.columns.len(), 10);
        assert!(matches!(
            users.columns.last().map(|c| &c.kind),
            Some(ColumnKind::Constraint(_))
        ));
        assert_eq!(table(&d, "tasks").columns.len(), 11);
    }
}
