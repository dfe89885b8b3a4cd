//! Wire-frame cube geometry and the column-major matrix helpers used to
//! animate it.

pub type Mat4 = [f32; 16];

pub const VERTICES: [[f32; 3]; 8] = [
    [1.0, 1.0, -1.0],
    [1.0, -1.0, -1.0],
    [-1.0, -1.0, -1.0],
    [-1.0, 1.0, -1.0],
    [1.0, 1.0, 1.0],
    [1.0, -1.0, 1.0],
    [-1.0, -1.0, 1.0],
    [-1.0, 1.0, 1.0],
];

pub const EDGES: [(usize, usize); 12] = [
    (0, 1),
    (1, 2),
    (2, 3),
    (3, 0),
    (4, 5),
    (5, 6),
    (6, 7),
    (7, 4),
    (0, 4),
    (1, 5),
    (2, 6),
    (3, 7),
];

/// Degrees added to the cube's rotation every frame.
pub const DEGREES_PER_FRAME: f32 = 1.0;

/// Axis the cube spins around (not normalized).
pub const ROTATION_AXIS: [f32; 3] = [3.0, 1.0, 1.0];

/// Flattened `GL_LINES` vertex stream: two xyz triples per edge.
pub fn line_vertices() -> Vec<f32> {
    EDGES
        .iter()
        .flat_map(|&(a, b)| VERTICES[a].into_iter().chain(VERTICES[b]))
        .collect()
}

pub fn identity() -> Mat4 {
    let mut m = [0.0; 16];
    m[0] = 1.0;
    m[5] = 1.0;
    m[10] = 1.0;
    m[15] = 1.0;
    m
}

/// `a * b` for column-major matrices.
pub fn multiply(a: &Mat4, b: &Mat4) -> Mat4 {
    let mut r = [0.0; 16];
    for col in 0..4 {
        for row in 0..4 {
            r[col * 4 + row] = (0..4).map(|k| a[k * 4 + row] * b[col * 4 + k]).sum();
        }
    }
    r
}

/// Same matrix as `gluPerspective`.
pub fn perspective(fovy_deg: f32, aspect: f32, near: f32, far: f32) -> Mat4 {
    let f = 1.0 / (fovy_deg.to_radians() / 2.0).tan();
    let mut m = [0.0; 16];
    m[0] = f / aspect;
    m[5] = f;
    m[10] = (far + near) / (near - far);
    m[11] = -1.0;
    m[14] = 2.0 * far * near / (near - far);
    m
}

pub fn translation(x: f32, y: f32, z: f32) -> Mat4 {
    let mut m = identity();
    m[12] = x;
    m[13] = y;
    m[14] = z;
    m
}

/// Same matrix as `glRotatef`: `angle_deg` counter-clockwise around `axis`.
pub fn rotation(angle_deg: f32, axis: [f32; 3]) -> Mat4 {
    let len = (axis[0] * axis[0] + axis[1] * axis[1] + axis[2] * axis[2]).sqrt();
    if len == 0.0 {
        return identity();
    }
    let [x, y, z] = axis.map(|v| v / len);
    let (s, c) = angle_deg.to_radians().sin_cos();
    let t = 1.0 - c;

    let mut m = identity();
    m[0] = t * x * x + c;
    m[1] = t * x * y + s * z;
    m[2] = t * x * z - s * y;
    m[4] = t * x * y - s * z;
    m[5] = t * y * y + c;
    m[6] = t * y * z + s * x;
    m[8] = t * x * z + s * y;
    m[9] = t * y * z - s * x;
    m[10] = t * z * z + c;
    m
}

/// Model-view-projection for frame `frame` of a `width`x`height` target:
/// 45 degree perspective, cube pushed 5 units back, rotated once per frame.
pub fn frame_mvp(frame: u64, width: u32, height: u32) -> Mat4 {
    let aspect = width as f32 / height.max(1) as f32;
    let projection = perspective(45.0, aspect, 0.1, 50.0);
    let view = translation(0.0, 0.0, -5.0);
    let angle = (frame as f32 * DEGREES_PER_FRAME) % 360.0;
    let model = rotation(angle, ROTATION_AXIS);
    multiply(&projection, &multiply(&view, &model))
}
