use std::sync::Arc;
use std::time::Instant;

use anyhow::{anyhow, Context, Result};
use backdrop::{fragment_fingerprint, mount_window, FrameStatus, SurfaceSize, WindowSession};
use effectconfig::BackdropConfig;
use tracing_subscriber::EnvFilter;
use winit::dpi::PhysicalSize;
use winit::event::{Event, WindowEvent};
use winit::event_loop::{EventLoopBuilder, EventLoopWindowTarget};
use winit::window::{Window, WindowBuilder};

use crate::bindings::{self, describe_parameters, ResolvedConfig};
use crate::cli::{CheckArgs, RunArgs};
use crate::messages::{self, HostMessage, UserEvent};
use crate::paths::AppPaths;

pub fn initialise_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

pub fn run(args: RunArgs) -> Result<()> {
    let paths = AppPaths::discover()?;
    let resolved = bindings::resolve(&args, &paths)?;
    tracing::debug!(
        config_dir = %paths.config_dir().display(),
        source = %resolved.source.describe(),
        "resolved shardsky configuration"
    );

    let event_loop = EventLoopBuilder::<UserEvent>::with_user_event()
        .build()
        .map_err(|err| anyhow!("failed to create event loop: {err}"))?;

    let (width, height) = resolved.window_size;
    let window = WindowBuilder::new()
        .with_title(resolved.title.as_str())
        .with_inner_size(PhysicalSize::new(width, height))
        .build(&event_loop)
        .map_err(|err| anyhow!("failed to create window: {err}"))?;
    let window = Arc::new(window);

    let mut session = match mount_window(Arc::clone(&window), resolved.parameters.clone()) {
        Ok(session) => session,
        Err(err) if err.is_unsupported() => {
            return Err(anyhow!(err).context("no usable GPU for the backdrop on this display"))
        }
        Err(err) => return Err(anyhow!(err).context("failed to start the backdrop renderer")),
    };
    tracing::info!(
        size = %format!("{width}x{height}"),
        source = %resolved.source.describe(),
        "backdrop mounted"
    );

    if args.listen_stdin {
        messages::spawn_stdin_reader(event_loop.create_proxy())
            .context("failed to spawn stdin reader")?;
        tracing::info!("listening for host messages on stdin");
    }

    let mut outcome = Ok(());
    event_loop
        .run(|event, elwt| {
            handle_event(event, elwt, &window, &mut session, &mut outcome);
        })
        .map_err(|err| anyhow!("window event loop error: {err}"))?;

    session.unmount();
    outcome
}

fn handle_event(
    event: Event<UserEvent>,
    elwt: &EventLoopWindowTarget<UserEvent>,
    window: &Window,
    session: &mut WindowSession,
    outcome: &mut Result<()>,
) {
    match event {
        Event::UserEvent(UserEvent::Host(HostMessage::ColorChange { color1, color2 })) => {
            let started = session.on_colors_changed(&color1, &color2, Instant::now());
            tracing::debug!(%color1, %color2, started, "color change applied");
        }
        Event::UserEvent(UserEvent::InputClosed) => {
            tracing::info!("host message stream closed; window stays open");
        }
        Event::WindowEvent { window_id, event } if window_id == window.id() => match event {
            WindowEvent::CloseRequested | WindowEvent::Destroyed => {
                session.unmount();
                elwt.exit();
            }
            WindowEvent::CursorMoved { position, .. } => {
                session.pointer_moved(position.x, position.y);
            }
            WindowEvent::Resized(size) => {
                session.resize(SurfaceSize::new(size.width, size.height));
            }
            WindowEvent::ScaleFactorChanged { scale_factor, .. } => {
                tracing::debug!(scale_factor, "scale factor changed");
                session.resize_to_container(window);
            }
            WindowEvent::RedrawRequested => match session.frame(Instant::now()) {
                Ok(FrameStatus::Rendered | FrameStatus::Skipped) => {}
                Ok(status) => tracing::debug!(?status, "frame not presented"),
                Err(err) => {
                    tracing::error!(error = %err, "backdrop renderer failed; shutting down");
                    session.unmount();
                    *outcome = Err(anyhow!(err).context("backdrop renderer failed"));
                    elwt.exit();
                }
            },
            _ => {}
        },
        _ => {}
    }
}

/// Validates configuration and prints the parameters a run would use.
pub fn check(args: CheckArgs) -> Result<()> {
    let paths = AppPaths::discover()?;
    let run_args = RunArgs {
        config: args.config,
        ..RunArgs::default()
    };
    let resolved = bindings::resolve(&run_args, &paths)?;
    print!("{}", render_report(&resolved)?);
    Ok(())
}

fn render_report(resolved: &ResolvedConfig) -> Result<String> {
    let mut report = BackdropConfig::default();
    report.effect = describe_parameters(&resolved.parameters);
    report.window.size = Some([resolved.window_size.0, resolved.window_size.1]);
    report.window.title = Some(resolved.title.clone());
    let body = report
        .to_toml_string()
        .context("failed to render resolved configuration")?;

    Ok(format!(
        "# source: {}\n# fragment shader: sha256:{}\n{body}",
        resolved.source.describe(),
        fragment_fingerprint()
    ))
}
