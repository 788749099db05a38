use bytes::{Bytes, BytesMut};
use criterion::{criterion_group, criterion_main, Criterion};
use http::{Method, StatusCode, Version};
use micro_h1::codec::{RequestDecoder, ResponseEncoder};
use micro_h1::connection::Connection;
use micro_h1::headers::Headers;
use micro_h1::protocol::{Message, PayloadSize, ResponseHead};
use std::hint::black_box;
use tokio_util::codec::{Decoder, Encoder};

const SIMPLE_REQUEST: &[u8] = b"GET / HTTP/1.1\r\nHost: localhost\r\n\r\n";

const CURL_REQUEST: &[u8] = b"POST /upload HTTP/1.1\r\n\
Host: 127.0.0.1:8080\r\n\
User-Agent: curl/7.79.1\r\n\
Accept: */*\r\n\
Accept-Encoding: gzip, deflate\r\n\
Cache-Control: max-age=60, private\r\n\
Cookie: session=abc; theme=dark\r\n\
Transfer-Encoding: chunked\r\n\
\r\n\
4\r\nWiki\r\n5\r\npedia\r\n0\r\n\r\n";

fn bench_request_decoder(c: &mut Criterion) {
    c.bench_function("decode_simple_request", |b| {
        b.iter(|| {
            let mut decoder = RequestDecoder::default();
            let mut bytes = BytesMut::from(SIMPLE_REQUEST);
            black_box(decoder.decode(&mut bytes).unwrap());
        });
    });

    c.bench_function("decode_chunked_request", |b| {
        b.iter(|| {
            let mut decoder = RequestDecoder::default();
            let mut bytes = BytesMut::from(CURL_REQUEST);
            while let Some(message) = decoder.decode(&mut bytes).unwrap() {
                black_box(message);
            }
        });
    });
}

fn bench_header_lookup(c: &mut Criterion) {
    let mut decoder = RequestDecoder::default();
    let mut bytes = BytesMut::from(CURL_REQUEST);
    let Some(Message::Header((head, _))) = decoder.decode(&mut bytes).unwrap() else {
        panic!("expect request head");
    };

    c.bench_function("merge_headers", |b| {
        b.iter(|| {
            // a fresh copy rebuilds the index on first lookup
            let headers = head.headers().duplicate();
            black_box(headers.get("cache-control").unwrap());
            black_box(headers.get("accept-encoding").unwrap());
        });
    });
}

fn bench_response_encoder(c: &mut Criterion) {
    let body = Bytes::from_static(b"Hello World!");

    c.bench_function("encode_simple_response", |b| {
        b.iter(|| {
            let mut encoder = ResponseEncoder::new();
            let mut bytes = BytesMut::new();
            let head = ResponseHead::new(Version::HTTP_11, StatusCode::OK, "", Headers::new());
            let message = Message::<_, Bytes>::Header((head, PayloadSize::Length(body.len() as u64)));
            encoder.encode(message, &mut bytes).unwrap();
            encoder.encode(Message::<(ResponseHead, PayloadSize)>::from(body.clone()), &mut bytes).unwrap();
            black_box(bytes);
        });
    });
}

fn bench_connection(c: &mut Criterion) {
    let runtime = tokio::runtime::Builder::new_current_thread().build().unwrap();

    c.bench_function("process_simple_request", |b| {
        b.iter(|| {
            runtime.block_on(async {
                let mut connection = Connection::new(SIMPLE_REQUEST, Vec::new());
                while let Some(request) = connection.read_request().await.unwrap() {
                    let status = if request.method() == Method::GET { StatusCode::OK } else { StatusCode::METHOD_NOT_ALLOWED };
                    connection.write_response(Version::HTTP_11, status, "", Headers::new(), "Hello World!").await.unwrap();
                }
                black_box(connection.into_parts());
            });
        });
    });
}

criterion_group!(benches, bench_request_decoder, bench_header_lookup, bench_response_encoder, bench_connection);
criterion_main!(benches);
