use std::path::PathBuf;
use std::sync::Arc;

use argh::FromArgs;

use unwarp::batch::{BatchJob, BatchRunner, CancelToken, ItemStatus};
use unwarp::io::functional::FsImageCodec;

#[derive(FromArgs)]
/// Correct lens distortion in a batch of images and videos
struct Args {
    /// image files, video files, or directories of images to correct
    #[argh(positional)]
    inputs: Vec<PathBuf>,

    /// destination directory for corrected outputs
    #[argh(option, short = 'o')]
    output_dir: PathBuf,

    /// comma-separated distortion coefficients k1,k2,p1,p2,k3
    #[argh(option, short = 'd')]
    dist_coeffs: String,

    /// comma-separated row-major 3x3 camera matrix (9 values)
    #[argh(option, short = 'k')]
    camera_matrix: String,

    /// number of items to process in parallel
    #[argh(option, short = 'j', default = "1")]
    concurrency: usize,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Args = argh::from_env();

    let mut job = BatchJob::new(
        args.inputs,
        args.output_dir,
        args.dist_coeffs,
        args.camera_matrix,
    );
    job.concurrency = args.concurrency;

    // create a cancel token to stop the batch on Ctrl-C
    let cancel_token = CancelToken::new();

    ctrlc::set_handler({
        let cancel_token = cancel_token.clone();
        move || {
            println!("Received Ctrl-C signal. Sending cancel signal !!");
            cancel_token.cancel();
        }
    })?;

    #[cfg(feature = "gstreamer")]
    let video_io = Arc::new(unwarp::io::gstreamer::GstVideoIo::default());

    #[cfg(not(feature = "gstreamer"))]
    let video_io = Arc::new(unwarp::io::video::UnsupportedVideoIo);

    let runner = BatchRunner::new(Arc::new(FsImageCodec), video_io);

    let summary = runner.run(
        &job,
        |snapshot| {
            log::info!(
                "item {}/{}: {:.0}% ({} settled)",
                snapshot.item_index + 1,
                snapshot.total_items,
                snapshot.item_fraction * 100.0,
                snapshot.items_done
            );
        },
        &cancel_token,
    )?;

    for (path, status) in &summary.items {
        match status {
            ItemStatus::Done => println!("done      {}", path.display()),
            ItemStatus::Failed(reason) => println!("failed    {} ({reason})", path.display()),
            ItemStatus::Cancelled => println!("cancelled {}", path.display()),
            _ => {}
        }
    }

    println!(
        "{} done, {} failed, {} cancelled",
        summary.done(),
        summary.failed(),
        summary.cancelled()
    );

    Ok(())
}
