// src/wgpu_utils/uniform_buffer.rs
//! Uniform buffer whose layout is only known at runtime

/// wgpu rejects zero-sized uniform bindings
const MIN_UNIFORM_SIZE: u64 = 16;

/// GPU uniform buffer mirrored by a byte staging area
pub struct UniformBuffer {
    buffer: wgpu::Buffer,
    previous_content: Vec<u8>,
}

impl UniformBuffer {
    /// Create a uniform buffer able to hold `size` bytes
    pub fn new(device: &wgpu::Device, label: &str, size: u64) -> Self {
        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(&format!("UniformBuffer: {}", label)),
            size: padded_size(size),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        UniformBuffer {
            buffer,
            previous_content: Vec::new(),
        }
    }

    /// Update buffer content (optimized to skip unnecessary writes)
    pub fn update_content(&mut self, queue: &wgpu::Queue, content: &[u8]) {
        if content.is_empty() || self.previous_content == content {
            return;
        }
        queue.write_buffer(&self.buffer, 0, content);
        self.previous_content = content.to_vec();
    }

    /// Get binding resource
    pub fn binding_resource(&self) -> wgpu::BindingResource {
        self.buffer.as_entire_binding()
    }
}

/// Rounds up to the 16-byte granularity uniform bindings require
fn padded_size(size: u64) -> u64 {
    size.max(MIN_UNIFORM_SIZE).div_ceil(MIN_UNIFORM_SIZE) * MIN_UNIFORM_SIZE
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_padded_size() {
        assert_eq!(padded_size(0), 16);
        assert_eq!(padded_size(16), 16);
        assert_eq!(padded_size(84), 96);
        assert_eq!(padded_size(224), 224);
    }
}
