//! Texture dimensions, texel formats and sampler kinds.

use std::fmt;

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum TextureDimension {
    D1,
    D2,
    D2Array,
    D3,
    Cube,
    CubeArray,
}

impl TextureDimension {
    pub const fn as_str(self) -> &'static str {
        match self {
            TextureDimension::D1 => "1d",
            TextureDimension::D2 => "2d",
            TextureDimension::D2Array => "2d_array",
            TextureDimension::D3 => "3d",
            TextureDimension::Cube => "cube",
            TextureDimension::CubeArray => "cube_array",
        }
    }
}

impl fmt::Display for TextureDimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Channel kind of a texel format, deciding the storage texture's element type.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum TexelKind {
    Float,
    Sint,
    Uint,
}

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum TexelFormat {
    Rgba8Unorm,
    Rgba8Snorm,
    Rgba8Uint,
    Rgba8Sint,
    Rgba16Uint,
    Rgba16Sint,
    Rgba16Float,
    R32Uint,
    R32Sint,
    R32Float,
    Rg32Uint,
    Rg32Sint,
    Rg32Float,
    Rgba32Uint,
    Rgba32Sint,
    Rgba32Float,
}

impl TexelFormat {
    pub const fn kind(self) -> TexelKind {
        match self {
            TexelFormat::Rgba8Uint
            | TexelFormat::Rgba16Uint
            | TexelFormat::R32Uint
            | TexelFormat::Rg32Uint
            | TexelFormat::Rgba32Uint => TexelKind::Uint,
            TexelFormat::Rgba8Sint
            | TexelFormat::Rgba16Sint
            | TexelFormat::R32Sint
            | TexelFormat::Rg32Sint
            | TexelFormat::Rgba32Sint => TexelKind::Sint,
            TexelFormat::Rgba8Unorm
            | TexelFormat::Rgba8Snorm
            | TexelFormat::Rgba16Float
            | TexelFormat::R32Float
            | TexelFormat::Rg32Float
            | TexelFormat::Rgba32Float => TexelKind::Float,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            TexelFormat::Rgba8Unorm => "rgba8unorm",
            TexelFormat::Rgba8Snorm => "rgba8snorm",
            TexelFormat::Rgba8Uint => "rgba8uint",
            TexelFormat::Rgba8Sint => "rgba8sint",
            TexelFormat::Rgba16Uint => "rgba16uint",
            TexelFormat::Rgba16Sint => "rgba16sint",
            TexelFormat::Rgba16Float => "rgba16float",
            TexelFormat::R32Uint => "r32uint",
            TexelFormat::R32Sint => "r32sint",
            TexelFormat::R32Float => "r32float",
            TexelFormat::Rg32Uint => "rg32uint",
            TexelFormat::Rg32Sint => "rg32sint",
            TexelFormat::Rg32Float => "rg32float",
            TexelFormat::Rgba32Uint => "rgba32uint",
            TexelFormat::Rgba32Sint => "rgba32sint",
            TexelFormat::Rgba32Float => "rgba32float",
        }
    }
}

impl fmt::Display for TexelFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum SamplerKind {
    Sampler,
    Comparison,
}
