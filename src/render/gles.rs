//! Headless OpenGL ES 3.0 backend: EGL device display, surfaceless context,
//! off-screen framebuffer and a single line-drawing program.

use glow::HasContext;
use glutin::api::egl::context::PossiblyCurrentContext;
use glutin::api::egl::device::Device;
use glutin::api::egl::display::Display;
use glutin::config::{Api, ConfigSurfaceTypes, ConfigTemplateBuilder};
use glutin::context::{ContextApi, ContextAttributesBuilder, Version};
use glutin::display::GlDisplay;
use tracing::{debug, info};

use super::cube::{self, Mat4};
use super::FrameSink;
use crate::bench::{BenchError, BenchResult};

const VERTEX_SHADER: &str = r#"#version 300 es
layout(location = 0) in vec3 a_pos;
uniform mat4 u_mvp;
void main() {
    gl_Position = u_mvp * vec4(a_pos, 1.0);
}
"#;

const FRAGMENT_SHADER: &str = r#"#version 300 es
precision mediump float;
out vec4 frag_color;
void main() {
    frag_color = vec4(1.0, 1.0, 1.0, 1.0);
}
"#;

fn render_err(e: impl std::fmt::Display) -> BenchError {
    BenchError::Render(e.to_string())
}

/// GL objects owned by the backend; deleted on drop.
struct Scene {
    program: glow::Program,
    vao: glow::VertexArray,
    vbo: glow::Buffer,
    fbo: glow::Framebuffer,
    color_rb: glow::Renderbuffer,
    depth_rb: glow::Renderbuffer,
    mvp_loc: Option<glow::UniformLocation>,
    vertex_count: i32,
}

pub struct GlesBackend {
    gl: glow::Context,
    scene: Option<Scene>,
    width: u32,
    height: u32,
    // Field order matters: the context must go before the display.
    _context: PossiblyCurrentContext,
    _display: Display,
}

impl GlesBackend {
    /// Create a surfaceless GLES 3.0 context on the first EGL device and
    /// prepare a `width`x`height` off-screen target.
    pub fn new(width: u32, height: u32) -> BenchResult<Self> {
        let device = Device::query_devices()
            .map_err(render_err)?
            .next()
            .ok_or_else(|| BenchError::Render("no EGL device found".to_string()))?;
        debug!(vendor = ?device.vendor(), "using EGL device");

        let display = unsafe { Display::with_device(&device, None) }.map_err(render_err)?;

        let template = ConfigTemplateBuilder::default()
            .with_api(Api::GLES3)
            .with_alpha_size(8)
            .with_surface_type(ConfigSurfaceTypes::empty())
            .build();
        let config = unsafe { display.find_configs(template) }
            .map_err(render_err)?
            .next()
            .ok_or_else(|| BenchError::Render("no GLES3 config available".to_string()))?;

        let attributes = ContextAttributesBuilder::new()
            .with_context_api(ContextApi::Gles(Some(Version::new(3, 0))))
            .build(None);
        let not_current =
            unsafe { display.create_context(&config, &attributes) }.map_err(render_err)?;
        let context = not_current.make_current_surfaceless().map_err(render_err)?;

        let gl = unsafe {
            glow::Context::from_loader_function_cstr(|name| display.get_proc_address(name).cast())
        };
        let (renderer, version) = unsafe {
            (
                gl.get_parameter_string(glow::RENDERER),
                gl.get_parameter_string(glow::VERSION),
            )
        };
        info!(%renderer, %version, "GLES context ready");

        let mut backend = Self {
            gl,
            scene: None,
            width,
            height,
            _context: context,
            _display: display,
        };
        backend.scene = Some(unsafe { backend.build_scene()? });
        Ok(backend)
    }

    unsafe fn compile(&self, kind: u32, source: &str) -> BenchResult<glow::Shader> {
        let gl = &self.gl;
        let shader = gl.create_shader(kind).map_err(render_err)?;
        gl.shader_source(shader, source);
        gl.compile_shader(shader);
        if !gl.get_shader_compile_status(shader) {
            let log = gl.get_shader_info_log(shader);
            gl.delete_shader(shader);
            return Err(BenchError::Render(format!("shader compile failed: {log}")));
        }
        Ok(shader)
    }

    unsafe fn build_scene(&self) -> BenchResult<Scene> {
        let gl = &self.gl;

        let vs = self.compile(glow::VERTEX_SHADER, VERTEX_SHADER)?;
        let fs = self.compile(glow::FRAGMENT_SHADER, FRAGMENT_SHADER)?;
        let program = gl.create_program().map_err(render_err)?;
        gl.attach_shader(program, vs);
        gl.attach_shader(program, fs);
        gl.link_program(program);
        gl.delete_shader(vs);
        gl.delete_shader(fs);
        if !gl.get_program_link_status(program) {
            let log = gl.get_program_info_log(program);
            gl.delete_program(program);
            return Err(BenchError::Render(format!("program link failed: {log}")));
        }
        let mvp_loc = gl.get_uniform_location(program, "u_mvp");

        let vertices = cube::line_vertices();
        let bytes: Vec<u8> = vertices.iter().flat_map(|v| v.to_ne_bytes()).collect();
        let vao = gl.create_vertex_array().map_err(render_err)?;
        gl.bind_vertex_array(Some(vao));
        let vbo = gl.create_buffer().map_err(render_err)?;
        gl.bind_buffer(glow::ARRAY_BUFFER, Some(vbo));
        gl.buffer_data_u8_slice(glow::ARRAY_BUFFER, &bytes, glow::STATIC_DRAW);
        gl.vertex_attrib_pointer_f32(0, 3, glow::FLOAT, false, 3 * 4, 0);
        gl.enable_vertex_attrib_array(0);

        let (w, h) = (self.width as i32, self.height as i32);
        let fbo = gl.create_framebuffer().map_err(render_err)?;
        gl.bind_framebuffer(glow::FRAMEBUFFER, Some(fbo));
        let color_rb = gl.create_renderbuffer().map_err(render_err)?;
        gl.bind_renderbuffer(glow::RENDERBUFFER, Some(color_rb));
        gl.renderbuffer_storage(glow::RENDERBUFFER, glow::RGBA8, w, h);
        gl.framebuffer_renderbuffer(
            glow::FRAMEBUFFER,
            glow::COLOR_ATTACHMENT0,
            glow::RENDERBUFFER,
            Some(color_rb),
        );
        let depth_rb = gl.create_renderbuffer().map_err(render_err)?;
        gl.bind_renderbuffer(glow::RENDERBUFFER, Some(depth_rb));
        gl.renderbuffer_storage(glow::RENDERBUFFER, glow::DEPTH_COMPONENT16, w, h);
        gl.framebuffer_renderbuffer(
            glow::FRAMEBUFFER,
            glow::DEPTH_ATTACHMENT,
            glow::RENDERBUFFER,
            Some(depth_rb),
        );
        let status = gl.check_framebuffer_status(glow::FRAMEBUFFER);
        if status != glow::FRAMEBUFFER_COMPLETE {
            return Err(BenchError::Render(format!(
                "framebuffer incomplete: 0x{status:x}"
            )));
        }

        gl.viewport(0, 0, w, h);
        gl.enable(glow::DEPTH_TEST);
        gl.clear_color(0.0, 0.0, 0.0, 1.0);
        gl.use_program(Some(program));

        Ok(Scene {
            program,
            vao,
            vbo,
            fbo,
            color_rb,
            depth_rb,
            mvp_loc,
            vertex_count: (vertices.len() / 3) as i32,
        })
    }
}

impl FrameSink for GlesBackend {
    fn draw_frame(&mut self, mvp: &Mat4) -> BenchResult<()> {
        let scene = self
            .scene
            .as_ref()
            .ok_or_else(|| BenchError::Render("scene not initialized".to_string()))?;
        let gl = &self.gl;
        unsafe {
            gl.clear(glow::COLOR_BUFFER_BIT | glow::DEPTH_BUFFER_BIT);
            gl.uniform_matrix_4_f32_slice(scene.mvp_loc.as_ref(), false, mvp);
            gl.draw_arrays(glow::LINES, 0, scene.vertex_count);
            gl.finish();
            let err = gl.get_error();
            if err != glow::NO_ERROR {
                return Err(BenchError::Render(format!("GL error 0x{err:x}")));
            }
        }
        Ok(())
    }
}

impl Drop for GlesBackend {
    fn drop(&mut self) {
        if let Some(scene) = self.scene.take() {
            let gl = &self.gl;
            unsafe {
                gl.delete_renderbuffer(scene.depth_rb);
                gl.delete_renderbuffer(scene.color_rb);
                gl.delete_framebuffer(scene.fbo);
                gl.delete_buffer(scene.vbo);
                gl.delete_vertex_array(scene.vao);
                gl.delete_program(scene.program);
            }
        }
    }
}
