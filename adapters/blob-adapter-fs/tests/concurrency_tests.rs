//! Concurrent access to the upload directory adapter

use std::sync::Arc;
use tempfile::TempDir;
use webpify_blob_adapter_fs::BlobAdapterFs;
use webpify_types::blob_adapter::BlobAdapter;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_writes() {
	let temp = TempDir::new().expect("Failed to create temp directory");
	let adapter =
		Arc::new(BlobAdapterFs::new(temp.path().into()).await.expect("Failed to create adapter"));

	let mut handles = vec![];
	for i in 0..8 {
		let adapter = Arc::clone(&adapter);
		handles.push(tokio::spawn(async move {
			let path = format!("2026/10/img-{}.webp", i);
			let data = format!("image data {}", i).into_bytes();
			adapter
				.write_file(&path, &data)
				.await
				.unwrap_or_else(|_| panic!("Failed to write file {}", i));
		}));
	}
	for handle in handles {
		handle.await.expect("Task panicked");
	}

	for i in 0..8 {
		let read = adapter.read_file(&format!("2026/10/img-{}.webp", i)).await.expect("read");
		assert_eq!(read.as_ref(), format!("image data {}", i).as_bytes());
	}
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_overwrites_leave_a_whole_file() {
	let temp = TempDir::new().expect("Failed to create temp directory");
	let adapter =
		Arc::new(BlobAdapterFs::new(temp.path().into()).await.expect("Failed to create adapter"));

	let mut handles = vec![];
	for i in 0..6u8 {
		let adapter = Arc::clone(&adapter);
		handles.push(tokio::spawn(async move {
			let data = vec![i; 4096];
			adapter.write_file("same.webp", &data).await.expect("write");
		}));
	}
	for handle in handles {
		handle.await.expect("Task panicked");
	}

	let read = adapter.read_file("same.webp").await.expect("read");
	assert_eq!(read.len(), 4096);
	assert!(read.iter().all(|b| *b == read[0]));
}
