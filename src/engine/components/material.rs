use glow::HasContext;

/// Decoded RGBA8 pixels, ready for upload.
#[derive(Debug, Clone, PartialEq)]
pub struct TextureData {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

#[derive(Debug, Clone)]
pub struct Material {
    pub base_color: [f32; 4],
    pub base_color_texture: Option<glow::Texture>,
}

impl Material {
    pub fn new(base_color: [f32; 4]) -> Self {
        Self {
            base_color,
            base_color_texture: None,
        }
    }

    pub fn with_texture(
        gl: &glow::Context,
        base_color: [f32; 4],
        texture: &TextureData
    ) -> Result<Self, String> {
        unsafe {
            let gl_texture = gl.create_texture()?;
            gl.bind_texture(glow::TEXTURE_2D, Some(gl_texture));
            gl.tex_image_2d(
                glow::TEXTURE_2D,
                0,
                glow::RGBA as i32,
                texture.width as i32,
                texture.height as i32,
                0,
                glow::RGBA,
                glow::UNSIGNED_BYTE,
                glow::PixelUnpackData::Slice(Some(&texture.pixels))
            );
            gl.generate_mipmap(glow::TEXTURE_2D);
            gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_MIN_FILTER, glow::LINEAR_MIPMAP_LINEAR as i32);
            gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_MAG_FILTER, glow::LINEAR as i32);
            gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_WRAP_S, glow::REPEAT as i32);
            gl.tex_parameter_i32(glow::TEXTURE_2D, glow::TEXTURE_WRAP_T, glow::REPEAT as i32);
            gl.bind_texture(glow::TEXTURE_2D, None);

            log::debug!("Texture uploaded: {}x{} pixels", texture.width, texture.height);

            Ok(Self {
                base_color,
                base_color_texture: Some(gl_texture),
            })
        }
    }

    /// Sets `base_color`/`has_texture` and binds the texture to unit 0.
    pub fn bind(&self, gl: &glow::Context, shader_program: glow::Program) {
        unsafe {
            if let Some(loc) = gl.get_uniform_location(shader_program, "base_color") {
                gl.uniform_4_f32_slice(Some(&loc), &self.base_color);
            }
            if let Some(loc) = gl.get_uniform_location(shader_program, "has_texture") {
                gl.uniform_1_i32(Some(&loc), i32::from(self.base_color_texture.is_some()));
            }
            if let Some(texture) = self.base_color_texture {
                if let Some(loc) = gl.get_uniform_location(shader_program, "base_color_texture") {
                    gl.uniform_1_i32(Some(&loc), 0);
                }
                gl.active_texture(glow::TEXTURE0);
                gl.bind_texture(glow::TEXTURE_2D, Some(texture));
            }
        }
    }

    pub fn cleanup(&self, gl: &glow::Context) {
        if let Some(texture) = self.base_color_texture {
            unsafe {
                gl.delete_texture(texture);
            }
        }
    }
}
