extern crate crayon_cache;
extern crate crayon_cache_bytes;
extern crate env_logger;

use std::fs;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use crayon_cache::prelude::*;
use crayon_cache_bytes::prelude::*;

fn testbed(name: &str) -> (PathBuf, ResourceCache) {
    let _ = env_logger::try_init();

    let dir = std::env::temp_dir().join(format!("crayon-cache-bytes-{}-{}", name, std::process::id()));
    let _ = fs::remove_dir_all(&dir);
    fs::create_dir_all(dir.join("nested")).unwrap();

    fs::write(dir.join("hello.txt"), b"Hello, World!").unwrap();
    fs::write(dir.join("nested").join("crate.bin"), vec![7u8; 32]).unwrap();

    let mut params = CacheParams::default();
    params.base_path = dir.to_string_lossy().into_owned();
    params.max_async_loads = 2;

    (dir, ResourceCache::new(params))
}

#[test]
fn load() {
    let (dir, cache) = testbed("load");

    assert!(crayon_cache_bytes::add_bytes(&cache, "hello", "hello.txt"));
    assert!(!crayon_cache_bytes::add_bytes(&cache, "hello", "nested/crate.bin"));

    let bytes = cache.resource_of_type::<BytesResource>("hello").unwrap();
    assert_eq!(bytes.filename(), dir.join("hello.txt").as_path());
    assert_eq!(bytes.len(), None);

    assert!(cache.load_resource("hello"));
    assert_eq!(bytes.bytes().unwrap(), b"Hello, World!".to_vec());
    assert_eq!(bytes.with_bytes(|v| v.len()), Some(13));

    cache.unload_resource("hello");
    assert_eq!(bytes.bytes(), None);

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn missing_file() {
    let (dir, cache) = testbed("missing");

    cache.add_resource(Arc::new(BytesResource::from_cache(&cache, "nope", "nope.txt")));
    assert!(!cache.load_resource("nope"));

    let res = cache.resource("nope").unwrap();
    assert!(res.is_failed());
    assert!(res.last_error().unwrap().contains("nope.txt"));

    // The file shows up later.
    fs::write(dir.join("nope.txt"), b"!").unwrap();
    assert!(cache.reload_resource("nope"));

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn directory() {
    let (dir, cache) = testbed("directory");

    assert_eq!(crayon_cache_bytes::add_directory(&cache, "").unwrap(), 2);
    assert!(cache.has_resource("hello.txt"));
    assert!(cache.has_resource("nested/crate.bin"));

    // Taken identifiers are skipped.
    assert_eq!(crayon_cache_bytes::add_directory(&cache, "nested").unwrap(), 0);
    assert!(crayon_cache_bytes::add_directory(&cache, "hello.txt").is_err());

    let loaded = Arc::new(AtomicBool::new(false));
    let tx = loaded.clone();
    assert!(cache.load_resource_async_with_callback("nested/crate.bin", move |res| {
        tx.store(res.is_loaded(), Ordering::SeqCst);
    }));

    let deadline = Instant::now() + Duration::from_secs(10);
    while !loaded.load(Ordering::SeqCst) && Instant::now() < deadline {
        cache.update();
        thread::sleep(Duration::from_millis(1));
    }

    assert!(loaded.load(Ordering::SeqCst));

    let bytes = cache.resources_of_type::<BytesResource>();
    assert_eq!(bytes.len(), 2);

    let _ = fs::remove_dir_all(&dir);
}
