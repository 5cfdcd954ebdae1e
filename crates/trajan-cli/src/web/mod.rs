//! HTTP front end: an upload form at `GET /` and the analysis endpoint at
//! `POST /analyze`, both rendering the same page.

pub mod chart;
pub mod page;
pub mod routes;
pub mod uploads;

use crate::config::ServerConfig;
use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use std::future::Future;
use std::sync::Arc;
use tokio::net::TcpListener;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServerConfig>,
}

pub fn router(config: ServerConfig) -> Router {
    let body_limit = config.max_upload_bytes;
    Router::new()
        .route("/", get(routes::index))
        .route("/analyze", post(routes::analyze))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(AppState {
            config: Arc::new(config),
        })
}

/// Serves requests on `listener` until `shutdown` resolves.
pub async fn serve<F>(
    listener: TcpListener,
    config: ServerConfig,
    shutdown: F,
) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    axum::serve(listener, router(config))
        .with_graceful_shutdown(shutdown)
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Point3;
    use std::net::SocketAddr;
    use std::path::Path;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpStream;
    use trajan::core::io::dcd::DcdWriter;
    use trajan::engine::config::AnalysisConfig;

    const BOUNDARY: &str = "trajan-test-boundary";

    const TRIPEPTIDE_PDB: &str = "\
ATOM      1  N   ALA A   1      -1.250   0.500   0.000  1.00  0.00           N
ATOM      2  CA  ALA A   1       0.000   0.000   0.000  1.00  0.00           C
ATOM      3  CA  GLY A   2       3.750   0.500   0.250  1.00  0.00           C
ATOM      4  CA  SER A   3       7.500   0.000   1.500  1.00  0.00           C
END
";

    const WATER_PDB: &str = "\
HETATM    1  O   HOH A   1       0.000   0.000   0.000  1.00  0.00           O
END
";

    fn trajectory_bytes(n_atoms: usize, n_frames: usize) -> Vec<u8> {
        let frames: Vec<Vec<Point3<f64>>> = (0..n_frames)
            .map(|f| {
                (0..n_atoms)
                    .map(|a| {
                        let (a, f) = (a as f64, f as f64);
                        Point3::new(3.75 * a, 0.25 * f * a, 0.5 * (a % 2.0))
                    })
                    .collect()
            })
            .collect();
        let mut bytes = Vec::new();
        DcdWriter::new(n_atoms).write_to(&mut bytes, &frames).unwrap();
        bytes
    }

    fn test_config(temp_dir: &Path) -> ServerConfig {
        ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            max_upload_bytes: 16 * 1024 * 1024,
            temp_dir: Some(temp_dir.to_path_buf()),
            analysis: AnalysisConfig {
                chunk_size: 2,
                total_frames: None,
            },
        }
    }

    async fn spawn_server(config: ServerConfig) -> SocketAddr {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(serve(listener, config, std::future::pending()));
        addr
    }

    async fn send(addr: SocketAddr, head: String, body: &[u8]) -> String {
        let mut stream = TcpStream::connect(addr).await.unwrap();
        stream.write_all(head.as_bytes()).await.unwrap();
        stream.write_all(body).await.unwrap();
        let mut response = Vec::new();
        stream.read_to_end(&mut response).await.unwrap();
        String::from_utf8_lossy(&response).into_owned()
    }

    async fn get_index(addr: SocketAddr) -> String {
        let head = "GET / HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n".to_string();
        send(addr, head, &[]).await
    }

    async fn post_files(addr: SocketAddr, parts: &[(&str, &str, &[u8])]) -> String {
        let mut body = Vec::new();
        for (name, file_name, content) in parts {
            body.extend_from_slice(
                format!(
                    "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"; filename=\"{file_name}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
                )
                .as_bytes(),
            );
            body.extend_from_slice(content);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

        let head = format!(
            "POST /analyze HTTP/1.1\r\nHost: localhost\r\nContent-Type: multipart/form-data; boundary={BOUNDARY}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
            body.len()
        );
        send(addr, head, &body).await
    }

    fn is_empty_dir(path: &Path) -> bool {
        std::fs::read_dir(path).unwrap().next().is_none()
    }

    #[tokio::test]
    async fn index_shows_the_empty_form() {
        let temp = tempfile::tempdir().unwrap();
        let addr = spawn_server(test_config(temp.path())).await;

        let response = get_index(addr).await;
        assert!(response.starts_with("HTTP/1.1 200"));
        assert!(response.contains(r#"name="pdb_file""#));
        assert!(response.contains(r#"name="dcd_file""#));
        assert!(!response.contains("Analysis error"));
        assert!(!response.contains("Plotly.newPlot"));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn analysis_renders_both_charts_and_cleans_up() {
        let temp = tempfile::tempdir().unwrap();
        let addr = spawn_server(test_config(temp.path())).await;
        let dcd = trajectory_bytes(3, 5);

        let response = post_files(
            addr,
            &[
                ("pdb_file", "ref.pdb", TRIPEPTIDE_PDB.as_bytes()),
                ("dcd_file", "traj.dcd", &dcd),
            ],
        )
        .await;

        assert!(response.starts_with("HTTP/1.1 200"));
        assert!(!response.contains("Analysis error"), "{}", response);
        assert!(response.contains("RMSD (Cα)"));
        assert!(response.contains("RMSF Profile (Cα)"));
        assert_eq!(response.matches("Plotly.newPlot").count(), 2);
        assert!(is_empty_dir(temp.path()));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn full_atom_trajectories_are_accepted() {
        let temp = tempfile::tempdir().unwrap();
        let addr = spawn_server(test_config(temp.path())).await;
        let dcd = trajectory_bytes(4, 3);

        let response = post_files(
            addr,
            &[
                ("pdb_file", "ref.pdb", TRIPEPTIDE_PDB.as_bytes()),
                ("dcd_file", "traj.dcd", &dcd),
            ],
        )
        .await;
        assert!(response.contains("RMSF Profile (Cα)"), "{}", response);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn structure_without_alpha_carbons_shows_plain_message() {
        let temp = tempfile::tempdir().unwrap();
        let addr = spawn_server(test_config(temp.path())).await;
        let dcd = trajectory_bytes(1, 2);

        let response = post_files(
            addr,
            &[
                ("pdb_file", "water.pdb", WATER_PDB.as_bytes()),
                ("dcd_file", "traj.dcd", &dcd),
            ],
        )
        .await;

        assert!(response.contains("No alpha-carbon (CA) atoms found in the PDB file!"));
        assert!(!response.contains("Analysis error"));
        assert!(!response.contains("Plotly.newPlot"));
        assert!(is_empty_dir(temp.path()));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn malformed_trajectory_is_a_prefixed_error() {
        let temp = tempfile::tempdir().unwrap();
        let addr = spawn_server(test_config(temp.path())).await;

        let response = post_files(
            addr,
            &[
                ("pdb_file", "ref.pdb", TRIPEPTIDE_PDB.as_bytes()),
                ("dcd_file", "traj.dcd", b"not a trajectory at all"),
            ],
        )
        .await;

        assert!(response.contains("Analysis error: "));
        assert!(!response.contains("Plotly.newPlot"));
        assert!(is_empty_dir(temp.path()));
    }

    #[tokio::test]
    async fn missing_upload_field_is_reported() {
        let temp = tempfile::tempdir().unwrap();
        let addr = spawn_server(test_config(temp.path())).await;

        let response =
            post_files(addr, &[("pdb_file", "ref.pdb", TRIPEPTIDE_PDB.as_bytes())]).await;

        assert!(response.contains("Analysis error: missing form field &#39;dcd_file&#39;"));
        assert!(is_empty_dir(temp.path()));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn requests_do_not_share_state() {
        let temp = tempfile::tempdir().unwrap();
        let addr = spawn_server(test_config(temp.path())).await;
        let dcd = trajectory_bytes(1, 2);

        let failed = post_files(
            addr,
            &[
                ("pdb_file", "water.pdb", WATER_PDB.as_bytes()),
                ("dcd_file", "traj.dcd", &dcd),
            ],
        )
        .await;
        assert!(failed.contains("No alpha-carbon"));

        let dcd = trajectory_bytes(3, 2);
        let succeeded = post_files(
            addr,
            &[
                ("pdb_file", "ref.pdb", TRIPEPTIDE_PDB.as_bytes()),
                ("dcd_file", "traj.dcd", &dcd),
            ],
        )
        .await;
        assert!(!succeeded.contains("No alpha-carbon"));
        assert_eq!(succeeded.matches("Plotly.newPlot").count(), 2);
    }
}
