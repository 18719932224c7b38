//! WebGL1 renderer for the mascot scene graph.

use crate::geometry::Mesh;
use crate::scene::{Draw, SceneGraph};
use crate::viewport::Camera;
use glam::{Mat3, Vec3};
use js_sys::{Float32Array, Object, Reflect, Uint16Array};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{
    HtmlCanvasElement, WebGlBuffer, WebGlProgram, WebGlRenderingContext as Gl, WebGlShader,
    WebGlUniformLocation,
};

const VERTEX_SHADER_SOURCE: &str = r#"
attribute vec3 a_position;
attribute vec3 a_normal;
uniform mat4 u_model;
uniform mat4 u_view_projection;
uniform mat3 u_normal_matrix;
varying vec3 v_normal;
void main() {
  v_normal = normalize(u_normal_matrix * a_normal);
  gl_Position = u_view_projection * u_model * vec4(a_position, 1.0);
}
"#;

const FRAGMENT_SHADER_SOURCE: &str = r#"
precision mediump float;
varying vec3 v_normal;
uniform vec3 u_color;
uniform float u_opacity;
uniform float u_lit;
uniform vec3 u_light_dirs[3];
uniform vec3 u_light_colors[3];
uniform vec3 u_ambient;
uniform float u_exposure;

vec3 aces(vec3 x) {
  return clamp((x * (2.51 * x + 0.03)) / (x * (2.43 * x + 0.59) + 0.14), 0.0, 1.0);
}

void main() {
  vec3 color = u_color;
  if (u_lit > 0.5) {
    vec3 n = normalize(v_normal);
    if (!gl_FrontFacing) n = -n;
    vec3 light = u_ambient;
    for (int i = 0; i < 3; i++) {
      light += u_light_colors[i] * max(dot(n, u_light_dirs[i]), 0.0);
    }
    color = aces(u_color * light * u_exposure);
  }
  gl_FragColor = vec4(color * u_opacity, u_opacity);
}
"#;

const AMBIENT: [f32; 3] = [0.9, 0.9, 0.9];
const EXPOSURE: f32 = 1.2;

/// Key, fill and back lights as (position, color, intensity).
const LIGHTS: [([f32; 3], u32, f32); 3] = [
    ([5.0, 8.0, 5.0], 0xffffff, 2.5),
    ([-5.0, 3.0, 5.0], 0xbbeeff, 0.8),
    ([0.0, 5.0, -5.0], 0xffeedd, 0.5),
];

pub fn js_value_to_string(value: &JsValue) -> String {
    value.as_string().unwrap_or_else(|| format!("{:?}", value))
}

pub fn gl_error_name(error: u32) -> &'static str {
    match error {
        Gl::NO_ERROR => "NO_ERROR",
        Gl::INVALID_ENUM => "INVALID_ENUM",
        Gl::INVALID_VALUE => "INVALID_VALUE",
        Gl::INVALID_OPERATION => "INVALID_OPERATION",
        Gl::OUT_OF_MEMORY => "OUT_OF_MEMORY",
        Gl::INVALID_FRAMEBUFFER_OPERATION => "INVALID_FRAMEBUFFER_OPERATION",
        Gl::CONTEXT_LOST_WEBGL => "CONTEXT_LOST_WEBGL",
        _ => "UNKNOWN_ERROR",
    }
}

pub fn gl_check(gl: &Gl, label: &str) -> Option<String> {
    let error = gl.get_error();
    if error == Gl::NO_ERROR {
        None
    } else {
        Some(format!(
            "gl error after {}: {} (0x{:x})",
            label,
            gl_error_name(error),
            error
        ))
    }
}

/// Transparent overlay context: alpha for the page behind, depth for the solids.
pub fn create_webgl_context(canvas: &HtmlCanvasElement) -> Result<Gl, JsValue> {
    let options = Object::new();
    Reflect::set(&options, &JsValue::from_str("alpha"), &JsValue::TRUE)?;
    Reflect::set(&options, &JsValue::from_str("antialias"), &JsValue::TRUE)?;
    Reflect::set(&options, &JsValue::from_str("depth"), &JsValue::TRUE)?;
    Reflect::set(&options, &JsValue::from_str("stencil"), &JsValue::FALSE)?;
    Reflect::set(
        &options,
        &JsValue::from_str("premultipliedAlpha"),
        &JsValue::TRUE,
    )?;

    let options = JsValue::from(options);
    let ctx = canvas
        .get_context_with_context_options("webgl", &options)?
        .or_else(|| canvas.get_context("webgl").ok().flatten())
        .ok_or_else(|| JsValue::from_str("WebGL unavailable"))?;

    ctx.dyn_into::<Gl>()
        .map_err(|_| JsValue::from_str("WebGL context is not a WebGlRenderingContext"))
}

pub fn compile_shader(gl: &Gl, shader_type: u32, source: &str) -> Result<WebGlShader, JsValue> {
    let shader = gl
        .create_shader(shader_type)
        .ok_or_else(|| JsValue::from_str("Unable to create shader"))?;
    gl.shader_source(&shader, source);
    gl.compile_shader(&shader);

    if gl
        .get_shader_parameter(&shader, Gl::COMPILE_STATUS)
        .as_bool()
        .unwrap_or(false)
    {
        Ok(shader)
    } else {
        let info = gl
            .get_shader_info_log(&shader)
            .unwrap_or_else(|| "Unknown shader error".to_string());
        Err(JsValue::from_str(&info))
    }
}

pub fn create_program(
    gl: &Gl,
    vertex_source: &str,
    fragment_source: &str,
) -> Result<WebGlProgram, JsValue> {
    let vertex_shader = compile_shader(gl, Gl::VERTEX_SHADER, vertex_source)?;
    let fragment_shader = compile_shader(gl, Gl::FRAGMENT_SHADER, fragment_source)?;

    let program = gl
        .create_program()
        .ok_or_else(|| JsValue::from_str("Unable to create program"))?;

    gl.attach_shader(&program, &vertex_shader);
    gl.attach_shader(&program, &fragment_shader);
    gl.link_program(&program);

    if gl
        .get_program_parameter(&program, Gl::LINK_STATUS)
        .as_bool()
        .unwrap_or(false)
    {
        Ok(program)
    } else {
        let info = gl
            .get_program_info_log(&program)
            .unwrap_or_else(|| "Unknown program error".to_string());
        Err(JsValue::from_str(&info))
    }
}

fn uniform(gl: &Gl, program: &WebGlProgram, name: &str) -> Result<WebGlUniformLocation, JsValue> {
    gl.get_uniform_location(program, name)
        .ok_or_else(|| JsValue::from_str(&format!("Missing uniform {name}")))
}

fn attribute(gl: &Gl, program: &WebGlProgram, name: &str) -> Result<u32, JsValue> {
    let location = gl.get_attrib_location(program, name);
    if location < 0 {
        return Err(JsValue::from_str(&format!("Missing attribute {name}")));
    }
    Ok(location as u32)
}

fn upload_f32(gl: &Gl, target: u32, data: &[f32]) -> Result<WebGlBuffer, JsValue> {
    let buffer = gl
        .create_buffer()
        .ok_or_else(|| JsValue::from_str("Unable to create buffer"))?;
    gl.bind_buffer(target, Some(&buffer));
    let array = Float32Array::from(data);
    gl.buffer_data_with_array_buffer_view(target, &array, Gl::STATIC_DRAW);
    Ok(buffer)
}

fn upload_u16(gl: &Gl, target: u32, data: &[u16]) -> Result<WebGlBuffer, JsValue> {
    let buffer = gl
        .create_buffer()
        .ok_or_else(|| JsValue::from_str("Unable to create buffer"))?;
    gl.bind_buffer(target, Some(&buffer));
    let array = Uint16Array::from(data);
    gl.buffer_data_with_array_buffer_view(target, &array, Gl::STATIC_DRAW);
    Ok(buffer)
}

struct GpuMesh {
    positions: WebGlBuffer,
    normals: WebGlBuffer,
    indices: WebGlBuffer,
    index_count: i32,
}

impl GpuMesh {
    fn upload(gl: &Gl, mesh: &Mesh) -> Result<Self, JsValue> {
        Ok(Self {
            positions: upload_f32(gl, Gl::ARRAY_BUFFER, &mesh.positions_flat())?,
            normals: upload_f32(gl, Gl::ARRAY_BUFFER, &mesh.normals_flat())?,
            indices: upload_u16(gl, Gl::ELEMENT_ARRAY_BUFFER, &mesh.indices)?,
            index_count: mesh.indices.len() as i32,
        })
    }
}

struct Uniforms {
    model: WebGlUniformLocation,
    view_projection: WebGlUniformLocation,
    normal_matrix: WebGlUniformLocation,
    color: WebGlUniformLocation,
    opacity: WebGlUniformLocation,
    lit: WebGlUniformLocation,
}

#[derive(Clone, Debug, Default)]
pub struct GlInfo {
    pub version: String,
    pub renderer: String,
    pub vendor: String,
    pub max_texture_size: i32,
}

impl GlInfo {
    fn query(gl: &Gl) -> Self {
        let text = |param| {
            gl.get_parameter(param)
                .ok()
                .and_then(|v| v.as_string())
                .unwrap_or_else(|| "unknown".to_string())
        };
        Self {
            version: text(Gl::VERSION),
            renderer: text(Gl::RENDERER),
            vendor: text(Gl::VENDOR),
            max_texture_size: gl
                .get_parameter(Gl::MAX_TEXTURE_SIZE)
                .ok()
                .and_then(|v| v.as_f64())
                .unwrap_or(0.0) as i32,
        }
    }
}

pub struct Renderer {
    gl: Gl,
    program: WebGlProgram,
    a_position: u32,
    a_normal: u32,
    uniforms: Uniforms,
    meshes: Vec<GpuMesh>,
    info: GlInfo,
    last_gl_error: Option<String>,
}

impl Renderer {
    /// Compiles the program and uploads every mesh in `scene` once.
    pub fn new(gl: Gl, scene: &SceneGraph) -> Result<Self, JsValue> {
        let program = create_program(&gl, VERTEX_SHADER_SOURCE, FRAGMENT_SHADER_SOURCE)?;
        gl.use_program(Some(&program));

        let uniforms = Uniforms {
            model: uniform(&gl, &program, "u_model")?,
            view_projection: uniform(&gl, &program, "u_view_projection")?,
            normal_matrix: uniform(&gl, &program, "u_normal_matrix")?,
            color: uniform(&gl, &program, "u_color")?,
            opacity: uniform(&gl, &program, "u_opacity")?,
            lit: uniform(&gl, &program, "u_lit")?,
        };
        let a_position = attribute(&gl, &program, "a_position")?;
        let a_normal = attribute(&gl, &program, "a_normal")?;

        let mut dirs = Vec::with_capacity(9);
        let mut colors = Vec::with_capacity(9);
        for (position, hex, intensity) in LIGHTS {
            dirs.extend_from_slice(&Vec3::from(position).normalize().to_array());
            colors.extend(crate::scene::hex_rgb(hex).map(|c| c * intensity));
        }
        gl.uniform3fv_with_f32_array(Some(&uniform(&gl, &program, "u_light_dirs")?), &dirs);
        gl.uniform3fv_with_f32_array(Some(&uniform(&gl, &program, "u_light_colors")?), &colors);
        gl.uniform3fv_with_f32_array(Some(&uniform(&gl, &program, "u_ambient")?), &AMBIENT);
        gl.uniform1f(Some(&uniform(&gl, &program, "u_exposure")?), EXPOSURE);

        let meshes = scene
            .meshes()
            .iter()
            .map(|mesh| GpuMesh::upload(&gl, mesh))
            .collect::<Result<Vec<_>, _>>()?;

        gl.enable(Gl::DEPTH_TEST);
        gl.depth_func(Gl::LEQUAL);
        // Thin parts (face plate, smile arc, screens) are seen from both sides.
        gl.disable(Gl::CULL_FACE);
        gl.enable(Gl::BLEND);
        gl.blend_func(Gl::ONE, Gl::ONE_MINUS_SRC_ALPHA);

        let info = GlInfo::query(&gl);
        let last_gl_error = gl_check(&gl, "renderer init");

        Ok(Self {
            gl,
            program,
            a_position,
            a_normal,
            uniforms,
            meshes,
            info,
            last_gl_error,
        })
    }

    pub fn gl(&self) -> &Gl {
        &self.gl
    }

    pub fn info(&self) -> &GlInfo {
        &self.info
    }

    pub fn last_gl_error(&self) -> Option<&str> {
        self.last_gl_error.as_deref()
    }

    pub fn mesh_count(&self) -> usize {
        self.meshes.len()
    }

    pub fn resize(&self, width: i32, height: i32) {
        self.gl.viewport(0, 0, width.max(1), height.max(1));
    }

    /// Clears to transparent and draws every visible node. Returns the draw count.
    pub fn draw(&mut self, scene: &SceneGraph, camera: &Camera) -> usize {
        let gl = &self.gl;
        if gl.is_context_lost() {
            return 0;
        }

        gl.clear_color(0.0, 0.0, 0.0, 0.0);
        gl.clear(Gl::COLOR_BUFFER_BIT | Gl::DEPTH_BUFFER_BIT);
        gl.use_program(Some(&self.program));
        gl.uniform_matrix4fv_with_f32_array(
            Some(&self.uniforms.view_projection),
            false,
            &camera.view_projection().to_cols_array(),
        );

        let (opaque, translucent): (Vec<Draw>, Vec<Draw>) = scene
            .world_draws()
            .into_iter()
            .partition(|d| d.material.opacity >= 1.0);

        let mut drawn = 0;
        gl.depth_mask(true);
        for draw in &opaque {
            drawn += usize::from(self.draw_one(draw));
        }
        self.gl.depth_mask(false);
        for draw in &translucent {
            drawn += usize::from(self.draw_one(draw));
        }
        self.gl.depth_mask(true);

        if let Some(err) = gl_check(&self.gl, "draw") {
            self.last_gl_error = Some(err);
        }
        drawn
    }

    fn draw_one(&self, draw: &Draw) -> bool {
        let Some(mesh) = self.meshes.get(draw.mesh) else {
            return false;
        };
        let gl = &self.gl;
        let normal_matrix = Mat3::from_mat4(draw.world).inverse().transpose();
        if !normal_matrix.is_finite() {
            return false;
        }

        gl.uniform_matrix4fv_with_f32_array(
            Some(&self.uniforms.model),
            false,
            &draw.world.to_cols_array(),
        );
        gl.uniform_matrix3fv_with_f32_array(
            Some(&self.uniforms.normal_matrix),
            false,
            &normal_matrix.to_cols_array(),
        );
        gl.uniform3fv_with_f32_array(Some(&self.uniforms.color), &draw.material.color);
        gl.uniform1f(Some(&self.uniforms.opacity), draw.material.opacity);
        gl.uniform1f(
            Some(&self.uniforms.lit),
            if draw.material.lit { 1.0 } else { 0.0 },
        );

        gl.bind_buffer(Gl::ARRAY_BUFFER, Some(&mesh.positions));
        gl.enable_vertex_attrib_array(self.a_position);
        gl.vertex_attrib_pointer_with_i32(self.a_position, 3, Gl::FLOAT, false, 0, 0);

        gl.bind_buffer(Gl::ARRAY_BUFFER, Some(&mesh.normals));
        gl.enable_vertex_attrib_array(self.a_normal);
        gl.vertex_attrib_pointer_with_i32(self.a_normal, 3, Gl::FLOAT, false, 0, 0);

        gl.bind_buffer(Gl::ELEMENT_ARRAY_BUFFER, Some(&mesh.indices));
        gl.draw_elements_with_i32(Gl::TRIANGLES, mesh.index_count, Gl::UNSIGNED_SHORT, 0);
        true
    }
}
