//! Shared helpers for depcache-unity integration tests.

#![allow(dead_code)]

use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

pub const PREFAB_GUID: &str = "3c2d1e0f9a8b7c6d5e4f3a2b1c0d9e8f";
pub const MATERIAL_GUID: &str = "1f4c0e3ab26d4e8f9a7b6c5d4e3f2a1b";
pub const TEXTURE_GUID: &str = "9fd2b1c4a7e04b56a1c3d2e1f0a9b8c7";
pub const SCRIPT_GUID: &str = "7a6b5c4d3e2f1a0b9c8d7e6f5a4b3c2d";
pub const SCENE_GUID: &str = "5e4f3a2b1c0d9e8f7a6b5c4d3e2f1a0b";
pub const PLUGIN_GUID: &str = "2b1c0d9e8f7a6b5c4d3e2f1a0b9c8d7e";
pub const BUILTIN_GUID: &str = "0000000000000000f000000000000000";

const PREFAB: &str = "%YAML 1.1
%TAG !u! tag:unity3d.com,2011:
--- !u!1 &100
GameObject:
  m_Component:
  - component: {fileID: 400}
  - component: {fileID: 2300}
  m_Name: Crate
  m_IsActive: 1
--- !u!4 &400
Transform:
  m_GameObject: {fileID: 100}
  m_Children:
  - {fileID: 401}
  m_Father: {fileID: 0}
--- !u!23 &2300
MeshRenderer:
  m_GameObject: {fileID: 100}
  m_Materials:
  - {fileID: 2100000, guid: 1f4c0e3ab26d4e8f9a7b6c5d4e3f2a1b, type: 2}
  - {fileID: 10303, guid: 0000000000000000f000000000000000, type: 0}
--- !u!1 &101
GameObject:
  m_Component:
  - component: {fileID: 401}
  - component: {fileID: 11400}
  m_Name: Lid
  m_IsActive: 0
--- !u!4 &401
Transform:
  m_GameObject: {fileID: 101}
  m_Children: []
  m_Father: {fileID: 400}
--- !u!114 &11400
MonoBehaviour:
  m_GameObject: {fileID: 101}
  m_Script: {fileID: 11500000, guid: 7a6b5c4d3e2f1a0b9c8d7e6f5a4b3c2d, type: 3}
";

const MATERIAL: &str = "%YAML 1.1
%TAG !u! tag:unity3d.com,2011:
--- !u!21 &2100000
Material:
  m_Name: Wood
  m_SavedProperties:
    m_TexEnvs:
    - _MainTex:
        m_Texture: {fileID: 2800000, guid: 9fd2b1c4a7e04b56a1c3d2e1f0a9b8c7, type: 3}
";

const SCENE: &str = "%YAML 1.1
%TAG !u! tag:unity3d.com,2011:
--- !u!1001 &9000
PrefabInstance:
  m_SourcePrefab: {fileID: 100100000, guid: 3c2d1e0f9a8b7c6d5e4f3a2b1c0d9e8f, type: 3}
";

/// Write `content` to `path` under `root`, creating parent directories.
pub fn write(root: &Path, path: &str, content: impl AsRef<[u8]>) {
    let full = root.join(path);
    std::fs::create_dir_all(full.parent().expect("path has a parent"))
        .expect("Failed to create directories");
    std::fs::write(&full, content).expect("Failed to write file");
}

/// Write an asset together with its `.meta` sidecar.
pub fn write_asset(root: &Path, path: &str, guid: &str, content: impl AsRef<[u8]>) {
    write(root, path, content);
    write(
        root,
        &format!("{path}.meta"),
        format!("fileFormatVersion: 2\nguid: {guid}\n"),
    );
}

/// A small project:
///
/// - `Level.unity` places `Crate.prefab`
/// - `Crate.prefab` uses `Wood.mat`, `Mover.cs` and a built-in mesh
/// - `Wood.mat` uses `Wood.png`
/// - `Plugins/Native.dll` is excluded by the settings file
/// - `Broken.mat` has no sidecar
/// - `Packages/` lies outside the include prefix
pub fn sample_project() -> TempDir {
    let temp = TempDir::new().expect("Failed to create temp directory");
    let root = temp.path();
    write_asset(root, "Assets/Crate.prefab", PREFAB_GUID, PREFAB);
    write_asset(root, "Assets/Wood.mat", MATERIAL_GUID, MATERIAL);
    write_asset(
        root,
        "Assets/Wood.png",
        TEXTURE_GUID,
        b"\x89PNG\r\n\x1a\n\x00\x00\xff",
    );
    write_asset(
        root,
        "Assets/Mover.cs",
        SCRIPT_GUID,
        "public class Mover {}\n",
    );
    write_asset(root, "Assets/Level.unity", SCENE_GUID, SCENE);
    write_asset(
        root,
        "Assets/Plugins/Native.dll",
        PLUGIN_GUID,
        b"MZ\x90\x00",
    );
    write(root, "Assets/Broken.mat", MATERIAL);
    write(root, "Packages/manifest.json", "{}");
    write(
        root,
        "depcache.yaml",
        "cache:\n  exclude-filters:\n    - \"Assets/Plugins/**\"\n",
    );
    temp
}

/// Run the depcache binary against `root`.
pub fn run_depcache(root: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_depcache"))
        .env("NO_COLOR", "1")
        .arg("--root")
        .arg(root)
        .args(args)
        .output()
        .expect("Failed to execute depcache")
}
