// SPDX-License-Identifier: GPL-3.0-or-later
// tests/selection_area.rs
//
// End-to-end behaviour of the selection area through its public API.

use std::sync::Arc;

use image::{DynamicImage, GenericImageView, ImageFormat, Rgba, RgbaImage};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use quadcrop::app::load_snapshot;
use quadcrop::domain::source::{decode_data_url, encode_data_url};
use quadcrop::domain::Surface;
use quadcrop::{AreaConfig, AreaMessage, BoundingBox, Point, SelectionArea, UpdateResult};

fn config() -> AreaConfig {
    AreaConfig {
        output_dir: None,
        ..AreaConfig::default()
    }
}

fn checker(width: u32, height: u32) -> RgbaImage {
    RgbaImage::from_fn(width, height, |x, y| {
        if (x / 10 + y / 10) % 2 == 0 {
            Rgba([255, 0, 0, 255])
        } else {
            Rgba([0, 0, 255, 255])
        }
    })
}

#[test]
fn locator_and_inline_sources_are_equivalent() {
    let pixels = checker(30, 20);
    let path = std::env::temp_dir().join(format!("quadcrop-source-{}.png", std::process::id()));
    pixels.save(&path).unwrap();

    let mut by_path = SelectionArea::new(config());
    let _ = by_path.set_image_url(format!("file://{}", path.display()));
    let mut inline = SelectionArea::new(config());
    let _ = inline.set_image_base64(encode_data_url(&pixels).unwrap());
    std::fs::remove_file(&path).ok();

    assert!(by_path.error().is_none());
    assert_eq!(by_path.dimensions(), (30, 20));
    assert_eq!(by_path.clipped().snapshot(), inline.clipped().snapshot());
}

/// Serve one HTTP response on a local port and return its base URL.
async fn serve_once(status: &'static str, body: Vec<u8>) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await.unwrap();
        let mut request = Vec::new();
        let mut buf = [0u8; 1024];
        while !request.windows(4).any(|w| w == b"\r\n\r\n") {
            let n = stream.read(&mut buf).await.unwrap();
            if n == 0 {
                break;
            }
            request.extend_from_slice(&buf[..n]);
        }
        let head = format!(
            "HTTP/1.1 {status}\r\nContent-Type: image/png\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
            body.len()
        );
        stream.write_all(head.as_bytes()).await.unwrap();
        stream.write_all(&body).await.unwrap();
        stream.shutdown().await.ok();
    });
    format!("http://{addr}")
}

#[tokio::test]
async fn remote_locator_is_fetched_and_shown() {
    let pixels = checker(30, 20);
    let mut png = Vec::new();
    pixels
        .write_to(&mut std::io::Cursor::new(&mut png), ImageFormat::Png)
        .unwrap();
    let base = serve_once("200 OK", png).await;

    let mut remote = SelectionArea::new(config());
    let result = remote.set_image_url(format!("{base}/checker.png"));
    assert!(matches!(result, UpdateResult::Fetch { .. }));
    remote.run(result).await;

    let mut inline = SelectionArea::new(config());
    let _ = inline.set_image_base64(encode_data_url(&pixels).unwrap());

    assert!(remote.error().is_none(), "{:?}", remote.error());
    assert_eq!(remote.dimensions(), (30, 20));
    assert_eq!(remote.clipped().snapshot(), inline.clipped().snapshot());
}

#[tokio::test]
async fn remote_error_status_is_reported() {
    let base = serve_once("404 Not Found", Vec::new()).await;

    let mut area = SelectionArea::new(config());
    let result = area.set_image_url(format!("{base}/missing.png"));
    area.run(result).await;

    assert!(area.error().is_some_and(|e| e.contains("404")));
    assert_eq!(area.dimensions(), (0, 0));
}

#[test]
fn inner_handle_move_keeps_full_bounding_box() {
    let mut area = SelectionArea::with_size(config(), 100, 100);
    let _ = area.set_image_base64(encode_data_url(&checker(50, 50)).unwrap());
    assert_eq!(area.dimensions(), (100, 100));

    let _ = area.move_handle(2, Point::new(50.0, 50.0));
    assert_eq!(
        area.bounding_box(),
        BoundingBox {
            offset_x: 0.0,
            offset_y: 0.0,
            width: 100.0,
            height: 100.0,
        }
    );
    assert_eq!(area.bounding_path()[2], Point::new(50.0, 50.0));

    // Bottom-right corner is now outside the mask.
    let clipped = area.clipped().snapshot();
    assert_eq!(clipped.get_pixel(95, 95).0[3], 0);
    assert_eq!(clipped.get_pixel(5, 5).0[3], 255);
}

#[test]
fn repeated_move_renders_identical_surfaces() {
    let mut area = SelectionArea::new(config());
    let _ = area.set_image_base64(encode_data_url(&checker(40, 40)).unwrap());

    let _ = area.move_handle(1, Point::new(33.3, 4.7));
    let overlay = area.overlay().snapshot();
    let clipped = area.clipped().snapshot();

    let _ = area.move_handle(1, Point::new(33.3, 4.7));
    assert_eq!(area.overlay().snapshot(), overlay);
    assert_eq!(area.clipped().snapshot(), clipped);
}

#[tokio::test]
async fn crop_is_sized_to_the_bounding_box() {
    let mut area = SelectionArea::new(config());
    let _ = area.set_image_base64(encode_data_url(&checker(60, 40)).unwrap());

    let _ = area.move_handle(0, Point::new(10.0, 0.0));
    let _ = area.move_handle(1, Point::new(50.0, 10.0));
    let _ = area.move_handle(2, Point::new(40.0, 40.0));
    let out = area
        .move_handle_and_crop(3, Point::new(0.0, 30.0))
        .await
        .map(str::to_string)
        .unwrap();

    let crop = decode_data_url(&out).unwrap();
    assert_eq!(crop.dimensions(), (50, 40));
    // Corner of the bounding box lies outside the quadrilateral.
    assert_eq!(crop.get_pixel(0, 0).0[3], 0);
    // Centre is inside.
    assert_eq!(crop.get_pixel(25, 20).0[3], 255);
}

#[tokio::test]
async fn fractional_bounding_box_rounds_outward() {
    let mut area = SelectionArea::new(config());
    let _ = area.set_image_base64(encode_data_url(&checker(60, 40)).unwrap());

    let _ = area.move_handle(0, Point::new(10.5, 2.25));
    let _ = area.move_handle(1, Point::new(30.0, 2.25));
    let _ = area.move_handle(3, Point::new(10.5, 20.0));
    let out = area
        .move_handle_and_crop(2, Point::new(30.0, 20.0))
        .await
        .map(str::to_string)
        .unwrap();

    // 10.5..30 -> 10..30, 2.25..20 -> 2..20
    let crop = decode_data_url(&out).unwrap();
    assert_eq!(crop.dimensions(), (20, 18));
}

#[tokio::test]
async fn oversized_selection_is_refused_without_panicking() {
    let mut area = SelectionArea::new(config());
    let _ = area.set_image_base64(encode_data_url(&checker(10, 10)).unwrap());

    let out = area.move_handle_and_crop(2, Point::new(f32::MAX, f32::MAX)).await;
    assert!(out.is_none());
    assert!(area.error().is_some());

    // A sane move afterwards still crops.
    let _ = area.dispatch(&AreaMessage::ClearError);
    let out = area.move_handle_and_crop(2, Point::new(8.0, 8.0)).await;
    assert!(out.is_some());
    assert!(area.error().is_none());
}

#[tokio::test]
async fn collapsed_selection_gives_empty_crop() {
    let mut area = SelectionArea::new(config());
    let _ = area.set_image_base64(encode_data_url(&checker(20, 20)).unwrap());
    for i in 0..4 {
        let _ = area.move_handle(i, Point::new(7.0, 7.0));
    }
    let out = area.move_handle_and_crop(0, Point::new(7.0, 7.0)).await;
    assert_eq!(out, Some("data:,"));
}

#[tokio::test]
async fn two_load_events_for_one_assignment_crop_once() {
    let mut area = SelectionArea::new(config());
    let _ = area.set_image_base64(encode_data_url(&checker(20, 20)).unwrap());

    let UpdateResult::Load { seq, snapshot } = area.move_handle(0, Point::new(4.0, 4.0)) else {
        panic!("expected a load request");
    };
    let message = load_snapshot(seq, snapshot).await;
    let _ = area.dispatch(&message);
    let first = area.output().map(str::to_string);

    // A second, different image for the same assignment must be ignored.
    let _ = area.dispatch(&AreaMessage::SourceLoaded {
        seq,
        image: Arc::new(DynamicImage::new_rgba8(20, 20)),
    });
    assert_eq!(area.output().map(str::to_string), first);
}

#[tokio::test]
async fn newest_crop_wins_when_loads_arrive_out_of_order() {
    let mut area = SelectionArea::new(config());
    let _ = area.set_image_base64(encode_data_url(&checker(20, 20)).unwrap());

    let UpdateResult::Load { seq: s1, snapshot: snap1 } = area.move_handle(2, Point::new(25.0, 25.0))
    else {
        panic!("expected a load request");
    };
    let UpdateResult::Load { seq: s2, snapshot: snap2 } = area.move_handle(2, Point::new(35.0, 30.0))
    else {
        panic!("expected a load request");
    };

    let (m1, m2) = tokio::join!(load_snapshot(s1, snap1), load_snapshot(s2, snap2));
    let _ = area.dispatch(&m2);
    let _ = area.dispatch(&m1);

    let crop = decode_data_url(area.output().unwrap()).unwrap();
    // The second move dragged the box past the image.
    assert_eq!(crop.dimensions(), (35, 30));
}
