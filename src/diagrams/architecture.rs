use crate::geometry::Point;
use crate::model::{
    Anchor, Annotation, ArrowHead, ArrowStroke, Connector, Diagram, Entity, Figure, Frame, Legend,
    LegendEntry, Side,
};
use crate::style::{self, TextStyle, architecture as palette};

pub const NAME: &str = "system-architecture";

const BOX_WIDTH: f32 = 2.0;
const BOX_HEIGHT: f32 = 1.5;
const ROW_Y: f32 = 5.0;
/// Vertical label offset, alternating sign from one connector to the next.
const LABEL_OFFSET: f32 = 0.2;

fn component(name: &str, x: f32, fill: &str, label: &str) -> Entity {
    Entity::label(name, Point::new(x, ROW_Y), BOX_WIDTH, BOX_HEIGHT, fill, label)
}

fn stroke() -> ArrowStroke {
    ArrowStroke {
        color: palette::ARROW.to_string(),
        width: 2.0,
        dashed: false,
        alpha: 1.0,
        curvature: 0.0,
        head: ArrowHead::scaled(0.4, 0.4, 20.0),
    }
}

/// The communication flow, request path first then the response path. Anchor
/// nudges are hand-tuned per pair.
fn flows() -> Vec<(Anchor, Anchor, &'static str)> {
    vec![
        (
            Anchor::new("client", Side::Right),
            Anchor::new("frontend", Side::Left),
            "HTTP/HTTPS\nRequests",
        ),
        (
            Anchor::new("frontend", Side::Left).nudge(0.1, 0.0),
            Anchor::new("backend", Side::Left).nudge(-0.1, 0.0),
            "REST API Calls",
        ),
        (
            Anchor::new("backend", Side::Right),
            Anchor::new("database", Side::Left).nudge(-0.1, 0.0),
            "SQL Queries",
        ),
        (
            Anchor::new("database", Side::Left).nudge(0.1, 0.0),
            Anchor::new("backend", Side::Left).nudge(-BOX_WIDTH, 0.0),
            "Query Results",
        ),
        (
            Anchor::new("backend", Side::Left).nudge(0.1, 0.0),
            Anchor::new("frontend", Side::Left).nudge(-0.1, 0.0),
            "JSON Responses",
        ),
        (
            Anchor::new("frontend", Side::Left),
            Anchor::new("client", Side::Right),
            "Rendered UI",
        ),
    ]
}

pub fn diagram() -> Diagram {
    let entities = vec![
        component("client", 1.0, palette::CLIENT, "Client Browser\n(HTTP/HTTPS)"),
        component("frontend", 4.0, palette::FRONTEND, "Frontend\nReact App\nPort: 3000"),
        component("backend", 7.0, palette::BACKEND, "Backend API\nExpress.js\nPort: 5000"),
        component("database", 10.0, palette::DATABASE, "Database\nPostgreSQL\nPort: 5432"),
    ];

    let connectors = flows()
        .into_iter()
        .enumerate()
        .map(|(i, (from, to, label))| {
            let dy = if i % 2 == 0 { LABEL_OFFSET } else { -LABEL_OFFSET };
            Connector {
                from,
                to,
                stroke: stroke(),
                labels: vec![
                    Annotation::centered(label, Point::new(0.0, dy), TextStyle::new(8.0).italic())
                        .framed(Frame::new(0.2, style::WHITE, style::BLACK).alpha(0.8)),
                ],
            }
        })
        .collect();

    let annotations = vec![
        Annotation::centered(
            "Multi-Tenant SaaS Architecture Diagram",
            Point::new(6.0, 9.0),
            TextStyle::new(16.0).bold().color(palette::TITLE),
        ),
        Annotation::centered(
            "Three-Tier Architecture with Docker Containers",
            Point::new(6.0, 8.5),
            TextStyle::new(12.0).color(palette::SUBTITLE),
        ),
        Annotation::centered(
            "Authentication: JWT Tokens | Data Isolation: tenant_id filtering",
            Point::new(6.0, 1.5),
            TextStyle::new(10.0).bold(),
        )
        .framed(Frame::new(0.5, palette::NOTE_FILL, palette::NOTE_EDGE)),
    ];

    let legend = Legend {
        entries: vec![
            LegendEntry::new(palette::FRONTEND, "Frontend Container (React)"),
            LegendEntry::new(palette::BACKEND, "Backend Container (Node.js)"),
            LegendEntry::new(palette::DATABASE, "Database Container (PostgreSQL)"),
        ],
        columns: 3,
        anchor: (0.5, 0.02),
        font_size: 9.0,
        frame_alpha: 0.9,
    };

    Diagram {
        name: NAME.to_string(),
        figure: Figure {
            width_in: 12.0,
            height_in: 8.0,
            x_range: (0.0, 12.0),
            y_range: (0.0, 10.0),
        },
        label_color: palette::TEXT.to_string(),
        entities,
        connectors,
        annotations,
        legend: Some(legend),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn endpoints(d: &Diagram, i: usize) -> (Point, Point) {
        let c = &d.connectors[i];
        (
            c.from.resolve(d.entity(&c.from.entity).unwrap()),
            c.to.resolve(d.entity(&c.to.entity).unwrap()),
        )
    }

    fn close(a: Point, b: Point) -> bool {
        a.distance(b) < 1e-4
    }

    #[test]
    fn has_four_components_and_six_flows() {
        let d = diagram();
        assert_eq!(d.entities.len(), 4);
        assert_eq!(d.connectors.len(), 6);
        assert!(d.validate().is_ok());
    }

    #[test]
    fn flow_endpoints_match_layout() {
        let d = diagram();
        let expected = [
            ((2.0, 5.0), (3.0, 5.0)),
            ((3.1, 5.0), (5.9, 5.0)),
            ((8.0, 5.0), (8.9, 5.0)),
            ((9.1, 5.0), (4.0, 5.0)),
            ((6.1, 5.0), (2.9, 5.0)),
            ((3.0, 5.0), (2.0, 5.0)),
        ];
        for (i, (from, to)) in expected.iter().enumerate() {
            let (start, end) = endpoints(&d, i);
            assert!(close(start, Point::new(from.0, from.1)), "flow {i} start {start:?}");
            assert!(close(end, Point::new(to.0, to.1)), "flow {i} end {end:?}");
        }
    }

    #[test]
    fn labels_alternate_above_and_below() {
        let d = diagram();
        let offsets: Vec<f32> = d
            .connectors
            .iter()
            .map(|c| c.labels[0].position.y)
            .collect();
        assert_eq!(offsets, vec![0.2, -0.2, 0.2, -0.2, 0.2, -0.2]);
    }
}
