//! Self-contained HTML document carrying an archive and its thumbnail
//!
//! The page offers the archive as a `.zip` download, as a `.png` container
//! built in the browser, and can regenerate itself around a new archive and
//! thumbnail. The in-page embedder mirrors [`crate::embed::embed`] byte for
//! byte: same header check, same EOCD window, same `ziPc` chunk layout.

/// Render the document for an archive and thumbnail given as Base64.
///
/// `filename` is the name shown in the page and used for downloads. It is
/// HTML-escaped in markup and JavaScript-escaped inside the script. The
/// Base64 payloads are inserted as-is.
pub fn generate_html(zip_base64: &str, png_base64: &str, filename: &str) -> String {
    let title = escape_html(filename);
    let script_name = escape_js(filename);

    render(
        TEMPLATE,
        &[
            ("TITLE", title.as_str()),
            ("CSS", STYLE),
            ("PNG_BASE64", png_base64),
            ("SCRIPT", SCRIPT),
        ],
        &[
            ("ZIP_BASE64", zip_base64),
            ("PNG_BASE64", png_base64),
            ("FILENAME", script_name.as_str()),
        ],
    )
}

/// Escape `& < > " '` for use in markup
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Escape `\ ' " LF CR` for use inside a JavaScript string literal, and `<`
/// so a name cannot close the surrounding `<script>` element
pub fn escape_js(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            '\'' => escaped.push_str("\\'"),
            '"' => escaped.push_str("\\\""),
            '\n' => escaped.push_str("\\n"),
            '\r' => escaped.push_str("\\r"),
            '<' => escaped.push_str("\\x3C"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Substitute `{{KEY}}` markers in one pass, so inserted values are never
/// scanned for markers themselves. `{{SCRIPT}}` is rendered with
/// `script_values` before insertion.
fn render(template: &str, values: &[(&str, &str)], script_values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len() + SCRIPT.len() + STYLE.len());
    let mut rest = template;

    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];

        let Some(end) = after.find("}}") else {
            out.push_str(&rest[start..]);
            return out;
        };

        let key = &after[..end];
        match values.iter().find(|(name, _)| *name == key) {
            Some((_, value)) if key == "SCRIPT" => out.push_str(&render(value, script_values, &[])),
            Some((_, value)) => out.push_str(value),
            None => out.push_str(&rest[start..start + 2 + end + 2]),
        }
        rest = &after[end + 2..];
    }

    out.push_str(rest);
    out
}

const TEMPLATE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8">
  <meta name="viewport" content="width=device-width, initial-scale=1.0">
  <title>{{TITLE}} - Binary Storage HTML</title>
  <style>
{{CSS}}
  </style>
</head>
<body>
  <div class="container">
    <h1>Binary Storage HTML</h1>

    <section class="download-section">
      <h2>Download {{TITLE}}</h2>
      <div class="thumbnail">
        <img src="data:image/png;base64,{{PNG_BASE64}}" alt="Thumbnail">
      </div>
      <div class="button-group">
        <button onclick="downloadZip()">Download as zip</button>
        <button onclick="downloadPng()">Download as png</button>
      </div>
    </section>

    <section class="generate-section">
      <h2>Generate a new page</h2>
      <div class="upload-area">
        <div class="form-group">
          <label for="zipFile">ZIP file:</label>
          <input type="file" id="zipFile" accept=".zip">
        </div>
        <div class="form-group">
          <label for="pngFile">PNG file (thumbnail):</label>
          <input type="file" id="pngFile" accept=".png">
        </div>
        <button onclick="generateNewHtml()">Generate and download HTML</button>
      </div>
    </section>
  </div>

  <script>
{{SCRIPT}}
  </script>
</body>
</html>
"#;

const STYLE: &str = r#"    * {
      margin: 0;
      padding: 0;
      box-sizing: border-box;
    }
    body {
      font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, 'Helvetica Neue', Arial, sans-serif;
      line-height: 1.6;
      color: #333;
      background: #f5f5f5;
      padding: 20px;
    }
    .container {
      max-width: 800px;
      margin: 0 auto;
      background: white;
      padding: 30px;
      border-radius: 8px;
      box-shadow: 0 2px 4px rgba(0,0,0,0.1);
    }
    h1 {
      color: #2c3e50;
      margin-bottom: 30px;
      text-align: center;
    }
    h2 {
      color: #34495e;
      margin: 20px 0 15px;
      padding-bottom: 10px;
      border-bottom: 2px solid #3498db;
    }
    section {
      margin-bottom: 40px;
    }
    .thumbnail {
      text-align: center;
      margin: 20px 0;
    }
    .thumbnail img {
      max-width: 100%;
      height: auto;
      border: 1px solid #ddd;
      border-radius: 4px;
    }
    .button-group {
      display: flex;
      gap: 10px;
      justify-content: center;
    }
    button {
      background: #3498db;
      color: white;
      border: none;
      padding: 12px 24px;
      border-radius: 4px;
      cursor: pointer;
      font-size: 16px;
    }
    button:hover {
      background: #2980b9;
    }
    .form-group {
      margin-bottom: 15px;
    }
    label {
      display: block;
      margin-bottom: 5px;
      font-weight: bold;
      color: #555;
    }
    input[type="file"] {
      width: 100%;
      padding: 8px;
      border: 1px solid #ddd;
      border-radius: 4px;
    }
    .upload-area {
      padding: 20px;
      background: #f9f9f9;
      border-radius: 4px;
    }"#;

const SCRIPT: &str = r#"    const EMBEDDED_ZIP_BASE64 = '{{ZIP_BASE64}}';
    const EMBEDDED_PNG_BASE64 = '{{PNG_BASE64}}';
    const EMBEDDED_FILENAME = '{{FILENAME}}';

    function base64ToBytes(base64) {
      const binary = atob(base64);
      const bytes = new Uint8Array(binary.length);
      for (let i = 0; i < binary.length; i++) {
        bytes[i] = binary.charCodeAt(i);
      }
      return bytes;
    }

    function downloadBlobAs(blob, name) {
      const url = URL.createObjectURL(blob);
      const a = document.createElement('a');
      a.href = url;
      a.download = name;
      document.body.appendChild(a);
      a.click();
      document.body.removeChild(a);
      URL.revokeObjectURL(url);
    }

    function downloadZip() {
      const blob = new Blob([base64ToBytes(EMBEDDED_ZIP_BASE64)], { type: 'application/zip' });
      downloadBlobAs(blob, EMBEDDED_FILENAME + '.zip');
    }

    function downloadPng() {
      try {
        const container = embedZipIntoPng(
          base64ToBytes(EMBEDDED_ZIP_BASE64),
          base64ToBytes(EMBEDDED_PNG_BASE64)
        );
        downloadBlobAs(new Blob([container], { type: 'image/png' }), EMBEDDED_FILENAME + '.png');
      } catch (error) {
        alert('PNG generation failed: ' + error.message);
      }
    }

    // IEEE 802.3, reflected
    const CRC_TABLE = (() => {
      const table = new Uint32Array(256);
      for (let n = 0; n < 256; n++) {
        let c = n;
        for (let k = 0; k < 8; k++) {
          c = (c & 1) ? (0xEDB88320 ^ (c >>> 1)) : (c >>> 1);
        }
        table[n] = c >>> 0;
      }
      return table;
    })();

    function crc32(bytes, previous) {
      let crc = (previous ^ -1) >>> 0;
      for (let i = 0; i < bytes.length; i++) {
        crc = (crc >>> 8) ^ CRC_TABLE[(crc ^ bytes[i]) & 0xFF];
      }
      return (crc ^ -1) >>> 0;
    }

    const PNG_HEADER = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x48, 0x44, 0x52];
    const PNG_PREFIX_LEN = 33;
    const CONTAINER_TAG = [0x7A, 0x69, 0x50, 0x63]; // ziPc
    const CONTAINER_OFFSET = 41;
    const SIG_EOCD = [0x50, 0x4B, 0x05, 0x06];
    const SIG_CEN = 0x02014B50;
    const EOCD_LEN = 22;
    const EOCD_WINDOW = 65557;
    const CEN_LEN = 46;

    function hasSignatureAt(bytes, pos) {
      return bytes[pos] === SIG_EOCD[0] && bytes[pos + 1] === SIG_EOCD[1] &&
        bytes[pos + 2] === SIG_EOCD[2] && bytes[pos + 3] === SIG_EOCD[3];
    }

    function findEocd(bytes) {
      const lowest = Math.max(0, bytes.length - EOCD_WINDOW);
      for (let i = bytes.length - EOCD_LEN; i >= lowest; i--) {
        if (hasSignatureAt(bytes, i)) {
          return i;
        }
      }
      throw new Error('EOCD signature not found');
    }

    function embedZipIntoPng(zipData, pngData) {
      if (pngData.length < PNG_PREFIX_LEN || PNG_HEADER.some((b, i) => pngData[i] !== b)) {
        throw new Error('Invalid PNG header');
      }
      for (let i = 0; i + 4 <= pngData.length; i++) {
        if (hasSignatureAt(pngData, i)) {
          throw new Error('PNG already contains an EOCD signature');
        }
      }

      const posEocd = findEocd(zipData);
      const zip = new Uint8Array(zipData);
      const view = new DataView(zip.buffer);
      const sizeCen = view.getUint32(posEocd + 12, true);
      const posCen = view.getUint32(posEocd + 16, true);

      if (sizeCen > 0) {
        if (posCen >= posEocd) {
          throw new Error('Invalid ZIP structure: central directory after EOCD');
        }
        if (view.getUint32(posCen, true) !== SIG_CEN) {
          throw new Error('Invalid ZIP structure: central directory signature not found');
        }
      }

      const entries = [];
      for (let size = 0; size < sizeCen;) {
        const entry = posCen + size;
        if (entry + CEN_LEN > zip.length) {
          throw new Error('Invalid ZIP structure: central directory runs past the end');
        }
        entries.push(entry);
        size += CEN_LEN + view.getUint16(entry + 28, true) +
          view.getUint16(entry + 30, true) + view.getUint16(entry + 32, true);
      }
      for (const entry of entries) {
        view.setUint32(entry + 42, (view.getUint32(entry + 42, true) + CONTAINER_OFFSET) >>> 0, true);
      }
      view.setUint32(posEocd + 16, (posCen + CONTAINER_OFFSET) >>> 0, true);

      if (findEocd(zip) !== posEocd) {
        throw new Error('Invalid ZIP structure: shifted offsets form an EOCD signature');
      }

      const out = new Uint8Array(pngData.length + zip.length + 12);
      const outView = new DataView(out.buffer);
      out.set(pngData.subarray(0, PNG_PREFIX_LEN), 0);
      outView.setUint32(PNG_PREFIX_LEN, zip.length, false);
      out.set(CONTAINER_TAG, PNG_PREFIX_LEN + 4);
      out.set(zip, CONTAINER_OFFSET);
      outView.setUint32(CONTAINER_OFFSET + zip.length, crc32(zip, crc32(CONTAINER_TAG, 0)), false);
      out.set(pngData.subarray(PNG_PREFIX_LEN), CONTAINER_OFFSET + zip.length + 4);
      return out;
    }

    function escapeHtml(text) {
      const map = { '&': '&amp;', '<': '&lt;', '>': '&gt;', '"': '&quot;', "'": '&#39;' };
      return text.replace(/[&<>"']/g, (c) => map[c]);
    }

    function escapeJs(text) {
      const map = { '\\': '\\\\', "'": "\\'", '"': '\\"', '\n': '\\n', '\r': '\\r', '<': '\\x3C' };
      return text.replace(/[\\'"\n\r<]/g, (c) => map[c]);
    }

    function fileToBase64(file) {
      return new Promise((resolve, reject) => {
        const reader = new FileReader();
        reader.onload = () => resolve(reader.result.split(',')[1]);
        reader.onerror = reject;
        reader.readAsDataURL(file);
      });
    }

    // Only the data slots change: title, heading, thumbnail and the three literals
    function regenerate(root, zipBase64, pngBase64, name) {
      root.querySelector('title').innerHTML = escapeHtml(name) + ' - Binary Storage HTML';
      root.querySelector('.download-section h2').innerHTML = 'Download ' + escapeHtml(name);
      root.querySelector('.thumbnail img').setAttribute('src', 'data:image/png;base64,' + pngBase64);

      const script = root.querySelector('script');
      script.textContent = script.textContent
        .replace(/const EMBEDDED_ZIP_BASE64 = '[^']*';/,
          () => "const EMBEDDED_ZIP_BASE64 = '" + zipBase64 + "';")
        .replace(/const EMBEDDED_PNG_BASE64 = '[^']*';/,
          () => "const EMBEDDED_PNG_BASE64 = '" + pngBase64 + "';")
        .replace(/const EMBEDDED_FILENAME = '(?:[^'\\]|\\.)*';/,
          () => "const EMBEDDED_FILENAME = '" + escapeJs(name) + "';");

      return '<!DOCTYPE html>\n' + root.outerHTML;
    }

    async function generateNewHtml() {
      const zipFile = document.getElementById('zipFile').files[0];
      const pngFile = document.getElementById('pngFile').files[0];
      if (!zipFile || !pngFile) {
        alert('Select both a ZIP file and a PNG file');
        return;
      }

      try {
        const zipBase64 = await fileToBase64(zipFile);
        const pngBase64 = await fileToBase64(pngFile);
        const name = zipFile.name.replace(/\.zip$/, '');

        const root = document.documentElement.cloneNode(true);
        const html = regenerate(root, zipBase64, pngBase64, name);
        downloadBlobAs(new Blob([html], { type: 'text/html' }), name + '.html');
      } catch (error) {
        alert('HTML generation failed: ' + error.message);
      }
    }"#;
