use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Pretty-prints any serializable value as JSON.
pub fn to_json<T: Serialize>(obj: &T) -> Result<String> {
    Ok(serde_json::to_string_pretty(obj)?)
}

pub fn read_json<T: DeserializeOwned>(path: &str) -> Result<T> {
    let contents = fs_err::read_to_string(path)?;
    serde_json::from_str(&contents).with_context(|| format!("parsing {}", path))
}

pub fn write_json<T: Serialize>(path: &str, obj: &T) -> Result<()> {
    write_or_print(Some(path), &to_json(obj)?)
}

/// Writes a string to a file, creating the parent directory if needed. Without a path, prints
/// to STDOUT instead.
pub fn write_or_print(path: Option<&str>, contents: &str) -> Result<()> {
    let path = match path {
        Some(path) => path,
        None => {
            println!("{}", contents);
            return Ok(());
        }
    };
    if let Some(parent) = std::path::Path::new(path).parent() {
        if !parent.as_os_str().is_empty() {
            fs_err::create_dir_all(parent)?;
        }
    }
    fs_err::write(path, contents)?;
    log::info!("Wrote {}", path);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_round_trip_through_a_file() {
        let dir = std::env::temp_dir().join("abstutil_io_test");
        let path = dir.join("nested").join("values.json");
        let path = path.to_str().unwrap();
        write_json(path, &vec![1.5, 2.0]).unwrap();
        let back: Vec<f64> = read_json(path).unwrap();
        assert_eq!(back, vec![1.5, 2.0]);
        assert!(read_json::<Vec<f64>>("/definitely/not/a/real/file.json").is_err());
        fs_err::remove_dir_all(dir).unwrap();
    }
}
