use wgpu::util::DeviceExt;

/// Uniform buffer holding one `Content` value
///
/// Keeps a CPU copy of what was last uploaded so per-frame writes of unchanged
/// data never reach the queue.
pub struct UniformBuffer<Content> {
    buffer: wgpu::Buffer,
    uploaded: Content,
}

impl<Content: bytemuck::Pod> UniformBuffer<Content> {
    pub fn with_content(device: &wgpu::Device, label: &str, content: &Content) -> Self {
        let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(label),
            contents: bytemuck::bytes_of(content),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        Self {
            buffer,
            uploaded: *content,
        }
    }

    /// Uploads `content`; returns whether a write was queued
    pub fn write(&mut self, queue: &wgpu::Queue, content: Content) -> bool {
        if !needs_upload(&self.uploaded, &content) {
            return false;
        }
        queue.write_buffer(&self.buffer, 0, bytemuck::bytes_of(&content));
        self.uploaded = content;
        true
    }

    pub fn content(&self) -> &Content {
        &self.uploaded
    }

    pub fn binding_resource(&self) -> wgpu::BindingResource {
        self.buffer.as_entire_binding()
    }
}

fn needs_upload<Content: bytemuck::Pod>(uploaded: &Content, next: &Content) -> bool {
    bytemuck::bytes_of(uploaded) != bytemuck::bytes_of(next)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unchanged_content_is_skipped() {
        let current = [1.0f32, 2.0, 3.0, 4.0];
        assert!(!needs_upload(&current, &[1.0, 2.0, 3.0, 4.0]));
        assert!(needs_upload(&current, &[1.0, 2.0, 3.0, 4.5]));
    }
}
