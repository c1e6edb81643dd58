use crate::types::{GalleryEntry, PageData};

/// Render the gallery page. The markup embeds the per-render signed
/// put URL and the signed get URL of every gallery entry; the inline
/// script mirrors the `form::UploadForm` transitions for the browser
/// (PUT directly against the store, success reloads after 1.5s,
/// failure re-enables the form) and drives the detail modal.
pub fn render(data: &PageData) -> String {
    let mut html = String::with_capacity(8 * 1024);

    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    html.push_str("<meta charset=\"utf-8\">\n");
    html.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n");
    html.push_str("<title>Image Gallery</title>\n");
    html.push_str(STYLE);
    html.push_str("</head>\n<body>\n<div class=\"container\">\n");

    html.push_str("<header>\n<h1>&#128248; Image Gallery</h1>\n");
    html.push_str("<p>Upload and share your images instantly</p>\n</header>\n");

    render_upload_section(&mut html);
    render_gallery_section(&mut html, &data.images);
    render_modal(&mut html);

    html.push_str("</div>\n");
    html.push_str("<script>\nconst UPLOAD_URL = ");
    // JSON string literal doubles as a JS string literal
    html.push_str(&serde_json::to_string(&data.upload.url).unwrap_or_else(|_| "\"\"".to_string()));
    html.push_str(";\n");
    html.push_str(SCRIPT);
    html.push_str("</script>\n</body>\n</html>\n");

    html
}

fn render_upload_section(html: &mut String) {
    html.push_str("<section class=\"card\">\n<h2>&#128640; Upload New Image</h2>\n");
    html.push_str("<form id=\"upload-form\">\n");
    html.push_str(
        "<input id=\"file-input\" name=\"file\" type=\"file\" \
         accept=\"image/png,image/jpeg,image/gif,image/webp\" required>\n",
    );
    html.push_str("<button id=\"upload-button\" type=\"submit\">Upload Image</button>\n");
    html.push_str(
        "<div id=\"upload-complete\" class=\"hidden\">&#9989; Upload successful! Refreshing...</div>\n",
    );
    html.push_str(
        "<p class=\"hint\">Supported formats: PNG, JPEG, GIF, WebP<br>Maximum file size: 10MB</p>\n",
    );
    html.push_str("</form>\n</section>\n");
}

fn render_gallery_section(html: &mut String, images: &[GalleryEntry]) {
    html.push_str(&format!(
        "<section class=\"card\">\n<h2>&#128444; Your Images ({})</h2>\n",
        images.len()
    ));

    if images.is_empty() {
        html.push_str(
            "<div class=\"empty\">\n<div class=\"glyph\">&#128247;</div>\n\
             <p>No images uploaded yet</p>\n<p class=\"hint\">Upload your first image above!</p>\n</div>\n",
        );
    } else {
        html.push_str("<div class=\"grid\">\n");
        for entry in images {
            html.push_str(&format!(
                "<figure class=\"thumb\" data-key=\"{key}\" data-url=\"{url}\" data-size=\"{size:.2}\">\n\
                 <img src=\"{url}\" alt=\"{name}\">\n\
                 <div class=\"placeholder hidden\">&#128444;</div>\n\
                 <figcaption>{name}<span>{size:.2} MB</span></figcaption>\n\
                 </figure>\n",
                key = escape_html(&entry.key),
                url = escape_html(&entry.url),
                name = escape_html(entry.filename()),
                size = entry.size_mb(),
            ));
        }
        html.push_str("</div>\n");
    }

    html.push_str("</section>\n");
}

fn render_modal(html: &mut String) {
    html.push_str(
        "<div id=\"modal\" class=\"modal hidden\">\n<div class=\"modal-box\">\n\
         <div class=\"modal-head\"><h3>Image Details</h3>\
         <button id=\"modal-close\">&times;</button></div>\n\
         <img id=\"modal-image\" alt=\"\">\n<p id=\"modal-name\"></p>\n\
         <div class=\"modal-actions\">\
         <button id=\"modal-open\">View Full Size</button>\
         <button id=\"modal-copy\">Copy URL</button></div>\n\
         </div>\n</div>\n",
    );
}

/// Escape text for HTML element and attribute positions
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

const STYLE: &str = "<style>\n\
body{margin:0;font-family:sans-serif;background:#eef2ff;color:#333}\n\
.container{max-width:960px;margin:0 auto;padding:2rem 1rem}\n\
header{text-align:center;margin-bottom:2rem}\n\
.card{background:#fff;border-radius:12px;box-shadow:0 4px 12px rgba(0,0,0,.08);padding:2rem;margin-bottom:2rem}\n\
.grid{display:grid;grid-template-columns:repeat(auto-fill,minmax(180px,1fr));gap:1rem}\n\
.thumb{margin:0;cursor:pointer;background:#f3f4f6;border-radius:8px;overflow:hidden}\n\
.thumb img{width:100%;height:160px;object-fit:cover;display:block}\n\
.thumb figcaption{padding:.5rem;font-size:.85rem;overflow:hidden;text-overflow:ellipsis;white-space:nowrap}\n\
.thumb figcaption span{display:block;color:#888;font-size:.75rem}\n\
.placeholder{height:160px;display:flex;align-items:center;justify-content:center;font-size:2.5rem;background:linear-gradient(135deg,#a78bfa,#f472b6)}\n\
.empty{text-align:center;padding:3rem 0;color:#888}\n\
.empty .glyph{font-size:3.5rem}\n\
.hint{color:#999;font-size:.85rem;text-align:center}\n\
.hidden{display:none}\n\
button{cursor:pointer;border:0;border-radius:8px;padding:.75rem 1.25rem;background:#4f46e5;color:#fff;font-size:1rem}\n\
button:disabled{background:#9ca3af;cursor:not-allowed}\n\
#upload-form{display:flex;flex-direction:column;gap:1rem;max-width:420px;margin:0 auto}\n\
#upload-complete{background:#dcfce7;border:1px solid #4ade80;color:#166534;padding:.75rem;border-radius:8px;text-align:center}\n\
.modal{position:fixed;inset:0;background:rgba(0,0,0,.75);display:flex;align-items:center;justify-content:center;z-index:50}\n\
.modal-box{background:#fff;border-radius:12px;padding:1.5rem;max-width:640px;width:90%}\n\
.modal-box img{width:100%;max-height:60vh;object-fit:contain}\n\
.modal-head{display:flex;justify-content:space-between;align-items:center}\n\
#modal-close{background:none;color:#666;font-size:1.5rem;padding:0}\n\
.modal-actions{display:grid;grid-template-columns:1fr 1fr;gap:.75rem;margin-top:1rem}\n\
#modal-copy{background:#e5e7eb;color:#111}\n\
</style>\n";

const SCRIPT: &str = r#"
const form = document.getElementById('upload-form');
const fileInput = document.getElementById('file-input');
const button = document.getElementById('upload-button');
const complete = document.getElementById('upload-complete');

form.addEventListener('submit', async (e) => {
  e.preventDefault();
  const file = fileInput.files[0];
  if (!file) { return; }
  if (!UPLOAD_URL) { console.error('No pre-signed URL provided'); return; }

  button.disabled = true;
  complete.classList.add('hidden');
  try {
    const response = await fetch(UPLOAD_URL, {
      method: 'PUT',
      body: file,
      headers: {
        'Content-Type': file.type,
        'Content-Disposition': `attachment; filename="${file.name}"`,
      },
    });
    if (response.ok) {
      complete.classList.remove('hidden');
      setTimeout(() => window.location.reload(), 1500);
    } else {
      console.error('Upload failed with status:', response.status);
      button.disabled = false;
    }
  } catch (err) {
    console.error('Upload failed:', err);
    button.disabled = false;
  }
});

const modal = document.getElementById('modal');
const modalImage = document.getElementById('modal-image');
const modalName = document.getElementById('modal-name');
let selectedUrl = null;

document.querySelectorAll('.thumb').forEach((thumb) => {
  const img = thumb.querySelector('img');
  img.addEventListener('error', () => {
    img.classList.add('hidden');
    thumb.querySelector('.placeholder').classList.remove('hidden');
  });
  thumb.addEventListener('click', () => {
    selectedUrl = thumb.dataset.url;
    modalImage.src = selectedUrl;
    modalName.textContent = thumb.dataset.key.split('/').pop();
    modal.classList.remove('hidden');
  });
});

function closeModal() {
  modal.classList.add('hidden');
  selectedUrl = null;
}

modal.addEventListener('click', (e) => { if (e.target === modal) closeModal(); });
document.getElementById('modal-close').addEventListener('click', closeModal);
document.getElementById('modal-open').addEventListener('click', () => {
  if (selectedUrl) window.open(selectedUrl, '_blank');
});
document.getElementById('modal-copy').addEventListener('click', () => {
  if (selectedUrl) navigator.clipboard.writeText(selectedUrl);
});
"#;
