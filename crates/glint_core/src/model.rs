use std::io::BufRead;
use std::path::Path;

use glam::{Vec2, Vec3};
use thiserror::Error;

use crate::color::Color;
use crate::vertex::Vertex;

/// Diffuse used when a shape has no material or the material omits `Kd`.
const DEFAULT_DIFFUSE: Color = Color::splat(0.8);

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to load OBJ: {0}")]
    Obj(#[from] tobj::LoadError),
}

/// One OBJ shape flattened to an indexed triangle list.
///
/// Material colors are baked into the vertices at load time; `indices` come
/// in groups of three and always point inside `vertices`.
#[derive(Debug, Clone)]
pub struct Shape {
    pub name: String,
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
}

impl Shape {
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }
}

#[derive(Debug, Clone, Default)]
pub struct Model {
    pub shapes: Vec<Shape>,
}

impl Model {
    /// Load an OBJ file, resolving its MTL library next to it.
    pub fn load_obj<P: AsRef<Path>>(path: P) -> Result<Model, LoadError> {
        let path = path.as_ref();
        let (models, materials) = tobj::load_obj(path, &load_options())?;
        let materials = materials.unwrap_or_else(|err| {
            log::warn!("no materials for {}: {err}", path.display());
            Vec::new()
        });

        let model = Model::from_tobj(models, &materials);
        if model.shapes.is_empty() {
            log::warn!("{} contains no shapes", path.display());
        }
        log::info!(
            "loaded {}: {} shapes, {} vertices, {} triangles",
            path.display(),
            model.shapes.len(),
            model.vertex_count(),
            model.triangle_count()
        );
        Ok(model)
    }

    /// Load OBJ text from a reader. Referenced MTL libraries are resolved
    /// through `material_loader`.
    pub fn from_obj_buf<R, ML>(reader: &mut R, material_loader: ML) -> Result<Model, LoadError>
    where
        R: BufRead,
        ML: Fn(&Path) -> tobj::MTLLoadResult,
    {
        let (models, materials) = tobj::load_obj_buf(reader, &load_options(), material_loader)?;
        Ok(Model::from_tobj(models, &materials.unwrap_or_default()))
    }

    pub fn vertex_count(&self) -> usize {
        self.shapes.iter().map(|s| s.vertices.len()).sum()
    }

    pub fn triangle_count(&self) -> usize {
        self.shapes.iter().map(|s| s.triangle_count()).sum()
    }

    fn from_tobj(models: Vec<tobj::Model>, materials: &[tobj::Material]) -> Model {
        let mut shapes = Vec::with_capacity(models.len());
        for m in models {
            let mesh = m.mesh;
            let (ambient, diffuse, emissive) =
                material_colors(mesh.material_id.and_then(|id| materials.get(id)));

            let vertex_count = mesh.positions.len() / 3;
            let has_normals = !mesh.normals.is_empty();
            let has_uvs = !mesh.texcoords.is_empty();
            let mut vertices = Vec::with_capacity(vertex_count);
            for i in 0..vertex_count {
                let position = Vec3::new(
                    mesh.positions[3 * i],
                    mesh.positions[3 * i + 1],
                    mesh.positions[3 * i + 2],
                );
                let normal = if has_normals {
                    Vec3::new(
                        mesh.normals[3 * i],
                        mesh.normals[3 * i + 1],
                        mesh.normals[3 * i + 2],
                    )
                } else {
                    Vec3::ZERO
                };
                let uv = if has_uvs {
                    Vec2::new(mesh.texcoords[2 * i], mesh.texcoords[2 * i + 1])
                } else {
                    Vec2::ZERO
                };
                vertices.push(Vertex {
                    position,
                    normal,
                    uv,
                    ambient,
                    diffuse,
                    emissive,
                });
            }

            if !has_normals {
                accumulate_normals(&mut vertices, &mesh.indices);
            }

            log::debug!(
                "shape {:?}: {} vertices, {} triangles",
                m.name,
                vertices.len(),
                mesh.indices.len() / 3
            );
            shapes.push(Shape {
                name: m.name,
                vertices,
                indices: mesh.indices,
            });
        }
        Model { shapes }
    }
}

/// Area-weighted vertex normals for meshes whose OBJ carries none.
fn accumulate_normals(vertices: &mut [Vertex], indices: &[u32]) {
    for tri in indices.chunks_exact(3) {
        let (a, b, c) = (tri[0] as usize, tri[1] as usize, tri[2] as usize);
        let ab = vertices[b].position - vertices[a].position;
        let ac = vertices[c].position - vertices[a].position;
        let face_normal = ab.cross(ac);
        vertices[a].normal += face_normal;
        vertices[b].normal += face_normal;
        vertices[c].normal += face_normal;
    }
    for vertex in vertices {
        vertex.normal = vertex.normal.normalize_or_zero();
    }
}

fn material_colors(material: Option<&tobj::Material>) -> (Color, Color, Color) {
    match material {
        Some(mat) => (
            mat.ambient.map(Vec3::from).unwrap_or(Color::ZERO),
            mat.diffuse.map(Vec3::from).unwrap_or(DEFAULT_DIFFUSE),
            // tobj does not parse Ke itself, it lands in unknown_param.
            mat.unknown_param
                .get("Ke")
                .and_then(|ke| parse_param_color(ke))
                .unwrap_or(Color::ZERO),
        ),
        None => (Color::ZERO, DEFAULT_DIFFUSE, Color::ZERO),
    }
}

fn parse_param_color(param: &str) -> Option<Color> {
    let parts: Vec<f32> = param
        .split_whitespace()
        .filter_map(|tok| tok.parse().ok())
        .collect();
    match parts[..] {
        [r, g, b] => Some(Color::new(r, g, b)),
        _ => None,
    }
}

fn load_options() -> tobj::LoadOptions {
    tobj::LoadOptions {
        single_index: true,
        triangulate: true,
        ..Default::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    // Unit quad in the XY plane, split into two triangles, no normals.
    const QUAD_OBJ: &str = "\
o quad
v 0.0 0.0 0.0
v 1.0 0.0 0.0
v 1.0 1.0 0.0
v 0.0 1.0 0.0
f 1 2 3
f 1 3 4
";

    fn load(obj: &str) -> Model {
        let _ = env_logger::builder().is_test(true).try_init();
        Model::from_obj_buf(&mut Cursor::new(obj), |_| Ok(Default::default())).unwrap()
    }

    #[test]
    fn test_quad_layout() {
        let model = load(QUAD_OBJ);
        assert_eq!(model.shapes.len(), 1);

        let shape = &model.shapes[0];
        assert_eq!(shape.name, "quad");
        assert_eq!(shape.vertices.len(), 4);
        assert_eq!(shape.indices, vec![0, 1, 2, 0, 2, 3]);
        assert_eq!(shape.triangle_count(), 2);
        assert_eq!(shape.vertices[2].position, Vec3::new(1.0, 1.0, 0.0));
    }

    #[test]
    fn test_missing_normals_are_computed() {
        let model = load(QUAD_OBJ);
        // Both faces wind counter-clockwise in the XY plane, so every
        // accumulated vertex normal points down +Z.
        for vertex in &model.shapes[0].vertices {
            assert!(vertex.normal.abs_diff_eq(Vec3::Z, 1e-6));
        }
    }

    #[test]
    fn test_obj_normals_pass_through() {
        let obj = "\
v 0.0 0.0 0.0
v 1.0 0.0 0.0
v 0.0 1.0 0.0
vn 0.0 -1.0 0.0
f 1//1 2//1 3//1
";
        let model = load(obj);
        for vertex in &model.shapes[0].vertices {
            assert_eq!(vertex.normal, Vec3::NEG_Y);
        }
    }

    #[test]
    fn test_texcoords_pass_through() {
        let obj = "\
v 0.0 0.0 0.0
v 1.0 0.0 0.0
v 0.0 1.0 0.0
vt 0.0 0.0
vt 1.0 0.0
vt 0.0 1.0
f 1/1 2/2 3/3
";
        let model = load(obj);
        let vertices = &model.shapes[0].vertices;
        assert_eq!(vertices[1].uv, Vec2::new(1.0, 0.0));
        assert_eq!(vertices[2].uv, Vec2::new(0.0, 1.0));
    }

    #[test]
    fn test_default_material_colors() {
        let model = load(QUAD_OBJ);
        let vertex = &model.shapes[0].vertices[0];
        assert_eq!(vertex.ambient, Color::ZERO);
        assert_eq!(vertex.diffuse, DEFAULT_DIFFUSE);
        assert_eq!(vertex.emissive, Color::ZERO);
    }

    #[test]
    fn test_material_colors_reads_ke() {
        let mut mat = tobj::Material::default();
        mat.ambient = Some([0.1, 0.2, 0.3]);
        mat.diffuse = Some([0.4, 0.5, 0.6]);
        mat.unknown_param
            .insert("Ke".to_string(), "1.0 0.5 0.25".to_string());

        let (ambient, diffuse, emissive) = material_colors(Some(&mat));
        assert_eq!(ambient, Color::new(0.1, 0.2, 0.3));
        assert_eq!(diffuse, Color::new(0.4, 0.5, 0.6));
        assert_eq!(emissive, Color::new(1.0, 0.5, 0.25));
    }

    #[test]
    fn test_malformed_ke_is_ignored() {
        assert_eq!(parse_param_color("1.0 0.5"), None);
        assert_eq!(parse_param_color("not a color"), None);
        assert_eq!(
            parse_param_color(" 0.0  1.0\t0.5 "),
            Some(Color::new(0.0, 1.0, 0.5))
        );
    }
}
