use crate::core::rasterizer::CullMode;
use crate::error::SceneResult;
use crate::io::config::Config;
use crate::io::image::{convert_to_grayscale, save_buffer_to_image};
use crate::io::importer::import_scene;
use crate::pipeline::passes::render_frame;
use crate::pipeline::renderer::Renderer;
use crate::scene::context::RenderContext;
use crate::ui::input::{EventPoller, ViewerControls};
use log::{info, warn};
use minifb::{Window, WindowOptions};
use nalgebra::{Matrix4, Vector3};
use std::path::Path;
use std::time::Instant;

/// Imports `scene_path` and wraps it in a render context configured by `config`.
pub fn load_context(scene_path: &Path, config: &Config) -> SceneResult<RenderContext> {
    let scene = import_scene(scene_path, config.texture_dir())?;
    let aspect = config.window.width as f32 / config.window.height.max(1) as f32;
    Ok(RenderContext::new(scene, config.scene_defaults(), aspect))
}

fn build_renderer(config: &Config, width: usize, height: usize) -> Renderer {
    let mut renderer = Renderer::new(width, height, config.render.samples)
        .with_cull_mode(CullMode::from_name(&config.render.cull_mode));
    renderer.rasterizer.wireframe = config.render.wireframe;
    renderer
}

/// Interactive viewer. Runs until the window closes or Escape is pressed.
pub fn run_gui(scene_path: &Path, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let mut context = load_context(scene_path, config)?;
    let width = config.window.width;
    let height = config.window.height;

    info!("Starting viewer ({}x{})...", width, height);
    info!("Controls: +/- scale, W/S/A/D and arrows move, left click toggles mouse rotation, Esc quits");

    let mut window = Window::new(
        &config.window.title,
        width,
        height,
        WindowOptions {
            resize: true,
            ..WindowOptions::default()
        },
    )?;
    window.set_target_fps(60);

    let mut renderer = build_renderer(config, width, height);
    let mut controls = ViewerControls::new(config.controls.clone(), width, height);
    let mut poller = EventPoller::new(width, height);
    let background = Vector3::from(config.render.background);

    let mut buffer = vec![0u32; width * height];
    let mut frame_count = 0;
    let mut last_fps_update = Instant::now();

    while window.is_open() && !controls.quit {
        for event in poller.poll(&window) {
            controls.handle(event);
        }
        if controls.quit {
            break;
        }

        let (w, h) = controls.viewport;
        if (w, h) != (renderer.width(), renderer.height()) {
            renderer.resize(w, h);
            buffer.resize(w * h, 0);
            context.set_viewport(w, h);
        }

        renderer.clear(background);
        render_frame(&mut context, &controls.transform.matrix(), &mut renderer);
        renderer.framebuffer.resolve_into(&mut buffer);
        window.update_with_buffer(&buffer, w, h)?;

        frame_count += 1;
        let elapsed = last_fps_update.elapsed().as_secs_f32();
        if elapsed >= 2.0 {
            let fps = frame_count as f32 / elapsed;
            window.set_title(&format!("{} - {:.1} FPS", config.window.title, fps));
            info!("Average FPS: {:.1}", fps);
            frame_count = 0;
            last_fps_update = Instant::now();
        }
    }

    info!("Viewer closed.");
    Ok(())
}

/// Renders a single frame without a window and writes it to `output`.
pub fn run_cli(scene_path: &Path, output: &Path, config: &Config) -> SceneResult<()> {
    info!("Starting headless render...");
    let mut context = load_context(scene_path, config)?;
    let width = config.window.width;
    let height = config.window.height;
    let start_time = Instant::now();

    let mut renderer = build_renderer(config, width, height);
    renderer.clear(Vector3::from(config.render.background));
    let draws = render_frame(&mut context, &Matrix4::identity(), &mut renderer);
    if draws == 0 {
        warn!("Scene produced no draws; the image will be empty");
    }
    info!("Rendered {} draws in {:.2?}", draws, start_time.elapsed());

    let mut buffer = vec![0u32; width * height];
    renderer.framebuffer.resolve_into(&mut buffer);
    save_buffer_to_image(&buffer, width, height, output)
}

/// Prints the scene summary and node tree to stdout.
pub fn print_scene_info(scene_path: &Path, config: &Config) -> SceneResult<()> {
    let context = load_context(scene_path, config)?;
    let scene = &context.scene;

    println!("Scene: {}", scene_path.display());
    println!("{}", scene.summary());
    println!(
        "Active lights: {} ({} bound to nodes)",
        context.lights.len(),
        context.bindings.bound_light_count()
    );
    match context
        .active_camera
        .and_then(|i| scene.cameras.get(i).map(|c| (i, c)))
    {
        Some((i, camera)) => println!("Active camera: {} ({})", i, camera.name),
        None => println!("Active camera: default"),
    }

    println!();
    for mesh in &scene.meshes {
        println!(
            "Mesh {}: {} vertices, {} triangles",
            mesh.name,
            mesh.vertex_count(),
            mesh.num_faces()
        );
    }
    for material in scene.materials.iter() {
        let textured = if material.has_texture() { " (textured)" } else { "" };
        println!("Material {}{}", material.name, textured);
    }
    println!();
    print!("{}", scene.tree());
    Ok(())
}

/// Writes an unweighted grayscale copy of `input` to `output`.
pub fn run_grayscale(input: &Path, output: &Path) -> SceneResult<()> {
    let start_time = Instant::now();
    let (width, height) = convert_to_grayscale(input, output)?;
    info!(
        "Grayscale conversion of {}x{} image took {:.2?}",
        width,
        height,
        start_time.elapsed()
    );
    Ok(())
}
