//! Test fixtures - archives shaped like the real Graphviz downloads.

#![allow(dead_code)]

use static_graphviz::Config;
use std::io::Write;
use std::path::Path;
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Stand-in for `dot`.
///
/// `-c` and `-V` succeed, `--exit N` exits with N, `--env` prints the library
/// path it was started with. Anything else echoes its arguments.
pub const FAKE_DOT: &str = r#"#!/bin/sh
case "$1" in
  -c) exit 0 ;;
  -V) echo "dot - graphviz version 2.42.2 (fake)" >&2; exit 0 ;;
  --exit) exit "$2" ;;
  --env) echo "LD_LIBRARY_PATH=$LD_LIBRARY_PATH"; exit 0 ;;
esac
echo "fake dot: $*"
"#;

pub const DEB_PATH: &str = "/ubuntu/pool/universe/g/graphviz/graphviz_2.42.2-3build2_amd64.deb";
pub const ZIP_PATH: &str = "/bins/Graphviz-12.2.1-win32.zip";

/// A `.deb` with an xz-compressed payload holding `usr/bin/dot`.
pub fn linux_deb() -> Vec<u8> {
    let payload: &[(&str, &[u8], u32)] = &[
        ("./usr/bin/dot", FAKE_DOT.as_bytes(), 0o755),
        ("./usr/lib/x86_64-linux-gnu/libgvc.so.6", b"\x7fELF", 0o644),
        ("./usr/share/doc/graphviz/copyright", b"EPL-1.0\n", 0o644),
    ];

    let encoder = xz2::write::XzEncoder::new(Vec::new(), 6);
    let mut tar = tar::Builder::new(encoder);
    for (name, content, mode) in payload {
        let mut header = tar::Header::new_gnu();
        header.set_size(content.len() as u64);
        header.set_mode(*mode);
        header.set_cksum();
        tar.append_data(&mut header, name, *content).unwrap();
    }
    let data = tar.into_inner().unwrap().finish().unwrap();

    let control = b"Package: graphviz\nVersion: 2.42.2-3build2\n".to_vec();
    deb_with(&[
        ("debian-binary", b"2.0\n".to_vec()),
        ("control.tar.xz", control),
        ("data.tar.xz", data),
    ])
}

/// Assemble an `ar` container from named members.
pub fn deb_with(members: &[(&str, Vec<u8>)]) -> Vec<u8> {
    let mut builder = ar::Builder::new(Vec::new());
    for (name, data) in members {
        let header = ar::Header::new(name.as_bytes().to_vec(), data.len() as u64);
        builder.append(&header, &data[..]).unwrap();
    }
    builder.into_inner().unwrap()
}

/// A release zip with its own top-level folder.
pub fn win32_zip() -> Vec<u8> {
    let mut zip = zip::ZipWriter::new(std::io::Cursor::new(Vec::new()));
    let options = zip::write::SimpleFileOptions::default();
    for (name, content) in [
        ("Graphviz-12.2.1-win32/bin/dot.exe", &b"MZ"[..]),
        ("Graphviz-12.2.1-win32/bin/gvc.dll", &b"MZ"[..]),
        ("Graphviz-12.2.1-win32/share/graphviz/README", &b"readme"[..]),
    ] {
        zip.start_file(name, options).unwrap();
        zip.write_all(content).unwrap();
    }
    zip.finish().unwrap().into_inner()
}

/// Serve `body` at `route`. `expected` is checked when the server drops.
pub async fn serve(server: &MockServer, route: &str, body: Vec<u8>, expected: u64) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(body))
        .expect(expected)
        .named(route.to_string())
        .mount(server)
        .await;
}

/// Number of requests the server has seen so far.
pub async fn request_count(server: &MockServer) -> usize {
    server
        .received_requests()
        .await
        .map(|requests| requests.len())
        .unwrap_or(0)
}

/// Config rooted at `base` that downloads from `url`.
pub fn test_config(base: &Path, url: &str) -> Config {
    Config::with_base_dir(base)
        .url_override(url)
        .download_timeout(Duration::from_secs(30))
        .lock_timeout(Duration::from_secs(60))
}
