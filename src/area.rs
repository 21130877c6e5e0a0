use crate::packet::{PacketError, PacketReader, PacketWriter};
use crate::util::Interval;
use serde::{Deserialize, Serialize};

const TAG_RECT: u8 = 0;
const TAG_POLYGON: u8 = 1;

/// The horizontal extent of an area-based entity such as a depot.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Area {
    /// An axis-aligned rectangle, inclusive of its edges.
    Rect { x: Interval<i32>, z: Interval<i32> },
    /// A simple polygon given by its vertices in `(x, z)` order.
    /// Points on the boundary may fall on either side.
    Polygon(Vec<(i32, i32)>),
}

impl Area {
    /// Creates a rectangle from two opposite corners.
    pub fn from_corners(corner1: (i32, i32), corner2: (i32, i32)) -> Self {
        Area::Rect {
            x: Interval::spanning(corner1.0, corner2.0),
            z: Interval::spanning(corner1.1, corner2.1),
        }
    }

    /// Returns true if the horizontal position lies within the area.
    pub fn contains(&self, x: i32, z: i32) -> bool {
        match self {
            Area::Rect { x: xs, z: zs } => xs.contains(x) && zs.contains(z),
            Area::Polygon(vertices) => polygon_contains(vertices, x as f64, z as f64),
        }
    }

    /// Writes the area as a tag byte followed by either the rectangle's
    /// corners or the polygon's vertex count and vertices.
    pub fn write_to(&self, writer: &mut PacketWriter) {
        match self {
            Area::Rect { x, z } => {
                writer.write_u8(TAG_RECT);
                for value in [x.min, z.min, x.max, z.max] {
                    writer.write_i32(value);
                }
            }
            Area::Polygon(vertices) => {
                writer.write_u8(TAG_POLYGON);
                writer.write_i32(vertices.len() as i32);
                for (x, z) in vertices {
                    writer.write_i32(*x);
                    writer.write_i32(*z);
                }
            }
        }
    }

    /// Reads an area written by [write_to](Self::write_to).
    pub fn read_from(reader: &mut PacketReader) -> Result<Self, PacketError> {
        match reader.read_u8()? {
            TAG_RECT => {
                let x1 = reader.read_i32()?;
                let z1 = reader.read_i32()?;
                let x2 = reader.read_i32()?;
                let z2 = reader.read_i32()?;
                Ok(Area::from_corners((x1, z1), (x2, z2)))
            }
            TAG_POLYGON => {
                let count = reader.read_i32()?;
                if count < 0 {
                    return Err(PacketError::InvalidLength(count as i64));
                }
                let vertices = (0..count)
                    .map(|_| Ok((reader.read_i32()?, reader.read_i32()?)))
                    .collect::<Result<_, PacketError>>()?;
                Ok(Area::Polygon(vertices))
            }
            tag => Err(PacketError::UnknownTag {
                kind: "area",
                tag: tag.to_string(),
            }),
        }
    }
}

impl Default for Area {
    fn default() -> Self {
        Area::Rect {
            x: Interval::new(0, 0),
            z: Interval::new(0, 0),
        }
    }
}

/// Even-odd ray casting test.
fn polygon_contains(vertices: &[(i32, i32)], x: f64, z: f64) -> bool {
    if vertices.len() < 3 {
        return false;
    }
    let mut inside = false;
    let mut j = vertices.len() - 1;
    for i in 0..vertices.len() {
        let (xi, zi) = (vertices[i].0 as f64, vertices[i].1 as f64);
        let (xj, zj) = (vertices[j].0 as f64, vertices[j].1 as f64);
        if (zi > z) != (zj > z) && x < (xj - xi) * (z - zi) / (zj - zi) + xi {
            inside = !inside;
        }
        j = i;
    }
    inside
}

#[cfg(test)]
mod test {
    use super::Area;
    use crate::packet::{PacketError, PacketReader, PacketWriter};

    #[test]
    fn rect_includes_edges() {
        let area = Area::from_corners((10, -5), (-10, 5));
        assert!(area.contains(0, 0));
        assert!(area.contains(10, 5));
        assert!(area.contains(-10, -5));
        assert!(!area.contains(11, 0));
        assert!(!area.contains(0, -6));
    }

    #[test]
    fn concave_polygon() {
        // An L shape
        let area = Area::Polygon(vec![(0, 0), (20, 0), (20, 10), (10, 10), (10, 20), (0, 20)]);
        assert!(area.contains(5, 5));
        assert!(area.contains(15, 5));
        assert!(area.contains(5, 15));
        assert!(!area.contains(15, 15));
        assert!(!area.contains(-1, 5));
    }

    #[test]
    fn degenerate_polygon_is_empty() {
        assert!(!Area::Polygon(vec![(0, 0), (10, 10)]).contains(5, 5));
    }

    #[test]
    fn packet_encoding() {
        let areas = [
            Area::from_corners((30, -4), (-2, 8)),
            Area::Polygon(vec![(0, 0), (5, 0), (0, 5)]),
        ];
        let mut writer = PacketWriter::new();
        for area in &areas {
            area.write_to(&mut writer);
        }
        let bytes = writer.into_bytes();
        // tag + 4 corners, then tag + count + 3 vertices
        assert_eq!(bytes.len(), 17 + 29);

        let mut reader = PacketReader::new(&bytes);
        assert_eq!(Area::read_from(&mut reader), Ok(areas[0].clone()));
        assert_eq!(Area::read_from(&mut reader), Ok(areas[1].clone()));
        assert_eq!(reader.remaining(), 0);
    }

    #[test]
    fn unknown_area_tag() {
        assert!(matches!(
            Area::read_from(&mut PacketReader::new(&[7])),
            Err(PacketError::UnknownTag { kind: "area", .. })
        ));
    }
}
