//! Persistence for simulation runs: one directory per session, holding a
//! contiguous sequence of `Image<N>.png` frames, plus the enumeration and
//! selection side used for replay.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::Local;
use image::{Rgb, RgbImage};
use log::info;
use ndarray::Array2;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("no sessions found under {}", .root.display())]
    NoSessionsFound { root: PathBuf },
    #[error("selection {input:?} is not a number between 1 and {count}")]
    InvalidSelection { input: String, count: usize },
    #[error("frame {} could not be decoded", .path.display())]
    FrameDecode {
        path: PathBuf,
        source: image::ImageError,
    },
    #[error("frame {index} of session {session} could not be written")]
    FrameWrite {
        session: String,
        index: u64,
        source: image::ImageError,
    },
    #[error("io error on {}", .path.display())]
    Io { path: PathBuf, source: io::Error },
}

pub type Result<T> = std::result::Result<T, StoreError>;

/// One recording run: a timestamped directory and the next frame number.
///
/// Frame numbers start at 1 and increment by exactly one per `save_frame`,
/// so a session of T ticks holds `Image1.png` through `ImageT.png` with no
/// gaps. Frame files are never rewritten.
pub struct Session {
    dir: PathBuf,
    next: u64,
}

impl Session {
    /// Creates `root/<local timestamp>/`. The directory must not already
    /// exist; two runs started within the same second do not share frames.
    pub fn create(root: &Path) -> Result<Session> {
        fs::create_dir_all(root).map_err(|source| StoreError::Io {
            path: root.to_path_buf(),
            source,
        })?;

        let name = Local::now().format("%Y-%m-%d_%H-%M-%S").to_string();
        let dir = root.join(name);
        fs::create_dir(&dir).map_err(|source| StoreError::Io {
            path: dir.clone(),
            source,
        })?;

        info!("recording session {}", dir.display());

        Ok(Session { dir, next: 1 })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn name(&self) -> String {
        self.dir
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// Encodes the canvas as `Image<N>.png` and returns N.
    ///
    /// The canvas has dimension `(width, height)` and is indexed `[[x, y]]`.
    /// Any encode or write failure is fatal for the run; the error carries
    /// the failing sequence number.
    pub fn save_frame(&mut self, canvas: &Array2<[u8; 3]>) -> Result<u64> {
        let index = self.next;
        let path = self.dir.join(format!("Image{}.png", index));

        let shape = canvas.dim();
        let mut img = RgbImage::new(shape.0 as u32, shape.1 as u32);

        for i in 0..shape.0 {
            for j in 0..shape.1 {
                img.put_pixel(i as u32, j as u32, Rgb(canvas[[i, j]]));
            }
        }

        img.save(&path).map_err(|source| StoreError::FrameWrite {
            session: self.name(),
            index,
            source,
        })?;

        self.next = index + 1;
        Ok(index)
    }
}

/// Session directories under the pictures root, sorted by name (the
/// timestamp format makes that chronological).
///
/// A missing or empty root is `NoSessionsFound`.
pub fn list_sessions(root: &Path) -> Result<Vec<PathBuf>> {
    let entries = match fs::read_dir(root) {
        Ok(entries) => entries,
        Err(ref e) if e.kind() == io::ErrorKind::NotFound => {
            return Err(StoreError::NoSessionsFound {
                root: root.to_path_buf(),
            })
        }
        Err(source) => {
            return Err(StoreError::Io {
                path: root.to_path_buf(),
                source,
            })
        }
    };

    let mut sessions = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| StoreError::Io {
            path: root.to_path_buf(),
            source,
        })?;
        if entry.path().is_dir() {
            sessions.push(entry.path());
        }
    }

    if sessions.is_empty() {
        return Err(StoreError::NoSessionsFound {
            root: root.to_path_buf(),
        });
    }

    sessions.sort();
    Ok(sessions)
}

/// Parses a 1-based menu selection against `count` entries, returning the
/// 0-based index. Non-numeric input, 0 and anything past `count` are
/// `InvalidSelection`, which the caller handles by re-prompting.
pub fn select(input: &str, count: usize) -> Result<usize> {
    let invalid = || StoreError::InvalidSelection {
        input: input.trim().to_string(),
        count,
    };

    let n: usize = input.trim().parse().map_err(|_| invalid())?;
    if n == 0 || n > count {
        return Err(invalid());
    }

    Ok(n - 1)
}

fn frame_number(name: &str) -> Option<u64> {
    let rest = name.strip_prefix("Image")?;
    let digits = rest.split('.').next()?;
    digits.parse().ok()
}

/// Frame files of a session, ordered by the numeric value of N in
/// `Image<N>.<ext>`, so `Image2` sorts before `Image10`. Entries that do
/// not match the pattern are ignored.
pub fn frame_paths(session: &Path) -> Result<Vec<PathBuf>> {
    let entries = fs::read_dir(session).map_err(|source| StoreError::Io {
        path: session.to_path_buf(),
        source,
    })?;

    let mut frames = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| StoreError::Io {
            path: session.to_path_buf(),
            source,
        })?;
        let path = entry.path();

        if let Some(n) = path
            .file_name()
            .and_then(|name| name.to_str())
            .and_then(frame_number)
        {
            frames.push((n, path));
        }
    }

    frames.sort_by_key(|&(n, _)| n);
    Ok(frames.into_iter().map(|(_, path)| path).collect())
}

/// Decodes one frame file. A missing, truncated or non-image file is
/// `FrameDecode`; the caller decides between skipping and aborting.
pub fn load_frame(path: &Path) -> Result<RgbImage> {
    let img = image::open(path).map_err(|source| StoreError::FrameDecode {
        path: path.to_path_buf(),
        source,
    })?;

    Ok(img.to_rgb8())
}

#[cfg(test)]
mod test {
    use super::*;
    use ndarray::Array;

    fn temp_root(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("frame_store_{}_{}", name, std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_session_numbers_frames_contiguously() {
        let root = temp_root("contiguous");
        let mut session = Session::create(&root).unwrap();
        let canvas = Array::from_elem((4, 4), [0u8; 3]);

        for expect in 1..=3 {
            assert_eq!(session.save_frame(&canvas).unwrap(), expect);
        }

        for n in 1..=3 {
            assert!(session.dir().join(format!("Image{}.png", n)).exists());
        }
        assert!(!session.dir().join("Image4.png").exists());

        let _ = fs::remove_dir_all(&root);
    }

    #[test]
    fn test_save_then_load_roundtrip() {
        let root = temp_root("roundtrip");
        let mut session = Session::create(&root).unwrap();

        let mut canvas = Array::from_elem((5, 3), [0u8; 3]);
        canvas[[4, 2]] = [255, 128, 1];
        session.save_frame(&canvas).unwrap();

        let img = load_frame(&session.dir().join("Image1.png")).unwrap();
        assert_eq!(img.dimensions(), (5, 3));
        assert_eq!(img.get_pixel(4, 2), &Rgb([255, 128, 1]));
        assert_eq!(img.get_pixel(0, 0), &Rgb([0, 0, 0]));

        let _ = fs::remove_dir_all(&root);
    }

    #[test]
    fn test_frame_paths_sorts_numerically() {
        let root = temp_root("numeric_sort");
        for name in &["Image10.png", "Image1.png", "Image2.png", "notes.txt"] {
            fs::write(root.join(name), b"stub").unwrap();
        }

        let frames = frame_paths(&root).unwrap();
        let names: Vec<_> = frames
            .iter()
            .map(|p| p.file_name().unwrap().to_str().unwrap().to_string())
            .collect();

        assert_eq!(names, ["Image1.png", "Image2.png", "Image10.png"]);

        let _ = fs::remove_dir_all(&root);
    }

    #[test]
    fn test_select_round_trips() {
        for n in 1..=3 {
            assert_eq!(select(&n.to_string(), 3).unwrap(), n - 1);
        }
        // Reader input comes with the newline still attached.
        assert_eq!(select("2\n", 3).unwrap(), 1);
    }

    #[test]
    fn test_select_rejects_out_of_range_and_garbage() {
        for input in &["0", "4", "-1", "two", "", "1.5"] {
            assert!(matches!(
                select(input, 3),
                Err(StoreError::InvalidSelection { .. })
            ));
        }
    }

    #[test]
    fn test_list_sessions_missing_or_empty_root() {
        let root = temp_root("empty_root");

        assert!(matches!(
            list_sessions(&root.join("does-not-exist")),
            Err(StoreError::NoSessionsFound { .. })
        ));
        assert!(matches!(
            list_sessions(&root),
            Err(StoreError::NoSessionsFound { .. })
        ));

        let _ = fs::remove_dir_all(&root);
    }

    #[test]
    fn test_list_sessions_ignores_plain_files() {
        let root = temp_root("ignores_files");
        fs::create_dir(root.join("2024-01-02_03-04-05")).unwrap();
        fs::write(root.join("stray.png"), b"stub").unwrap();

        let sessions = list_sessions(&root).unwrap();
        assert_eq!(sessions.len(), 1);
        assert!(sessions[0].ends_with("2024-01-02_03-04-05"));

        let _ = fs::remove_dir_all(&root);
    }

    #[test]
    fn test_load_frame_rejects_garbage() {
        let root = temp_root("garbage_frame");
        let path = root.join("Image1.png");
        fs::write(&path, b"not a png").unwrap();

        assert!(matches!(
            load_frame(&path),
            Err(StoreError::FrameDecode { .. })
        ));

        let _ = fs::remove_dir_all(&root);
    }
}
