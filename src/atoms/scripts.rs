//! JavaScript sources for the automation atoms
//!
//! Every atom is an anonymous function over the page. The prelude is shared
//! by all of them: it owns the page-side element cache, translates element
//! handles in both directions and turns thrown errors into status codes.

/// Page-side helpers available to every atom body
pub const PRELUDE: &str = r#"
  var cache = window.__ghostElementCache || (window.__ghostElementCache = { seq: 0, nodes: {} });
  // node -> id
  cache.ids = cache.ids || new WeakMap();

  function fail(status, message) {
    var err = new Error(message);
    err.status = status;
    throw err;
  }

  function wrap(node) {
    var known = cache.ids.get(node);
    if (known && cache.nodes[known] === node) {
      return { ELEMENT: known };
    }
    var id = ':wdc:' + (++cache.seq);
    cache.nodes[id] = node;
    cache.ids.set(node, id);
    return { ELEMENT: id };
  }

  function unwrap(ref) {
    var node = cache.nodes[ref.ELEMENT];
    if (!node) {
      fail(10, 'Element does not exist in cache');
    }
    if (!node.ownerDocument || !node.ownerDocument.documentElement.contains(node)) {
      delete cache.nodes[ref.ELEMENT];
      cache.ids.delete(node);
      fail(10, 'Element is no longer attached to the DOM');
    }
    return node;
  }

  function decode(arg) {
    if (Array.isArray(arg)) {
      return arg.map(decode);
    }
    if (arg && typeof arg === 'object' && typeof arg.ELEMENT === 'string') {
      return unwrap(arg);
    }
    return arg;
  }

  function encode(value) {
    if (value === undefined) {
      return null;
    }
    if (value && value.nodeType === 1) {
      return wrap(value);
    }
    if (Array.isArray(value)) {
      return value.map(encode);
    }
    return value;
  }

  function isShown(el) {
    if (el.tagName.toUpperCase() === 'INPUT' && (el.type || '').toLowerCase() === 'hidden') {
      return false;
    }
    if (el.tagName.toUpperCase() === 'OPTION') {
      var select = el.closest('select');
      return select ? isShown(select) : true;
    }
    for (var n = el; n && n.nodeType === 1; n = n.parentElement) {
      var style = window.getComputedStyle(n);
      if (style.display === 'none') {
        return false;
      }
      if (parseFloat(style.opacity) === 0) {
        return false;
      }
    }
    var own = window.getComputedStyle(el);
    if (own.visibility === 'hidden' || own.visibility === 'collapse') {
      return false;
    }
    var rect = el.getBoundingClientRect();
    return rect.width > 0 && rect.height > 0;
  }

  function quote(value) {
    return '"' + String(value).replace(/\\/g, '\\\\').replace(/"/g, '\\"') + '"';
  }

  function locate(using, value, root) {
    var scope = root || document;
    var found;
    try {
      switch (using) {
        case 'css selector':
          found = scope.querySelectorAll(value);
          break;
        case 'class name':
          if (/\s/.test(value.trim())) {
            fail(32, 'Compound class names are not permitted');
          }
          found = scope.getElementsByClassName(value);
          break;
        case 'id':
          found = scope.querySelectorAll('[id=' + quote(value) + ']');
          break;
        case 'name':
          found = scope.querySelectorAll('[name=' + quote(value) + ']');
          break;
        case 'tag name':
          found = scope.getElementsByTagName(value);
          break;
        case 'link text':
        case 'partial link text':
          found = Array.prototype.filter.call(scope.querySelectorAll('a'), function (a) {
            var text = (a.innerText || a.textContent || '').trim();
            return using === 'link text' ? text === value : text.indexOf(value) !== -1;
          });
          break;
        case 'xpath':
          var snapshot = document.evaluate(value, scope, null, XPathResult.ORDERED_NODE_SNAPSHOT_TYPE, null);
          found = [];
          for (var i = 0; i < snapshot.snapshotLength; i++) {
            var item = snapshot.snapshotItem(i);
            if (item.nodeType !== 1) {
              fail(32, 'The result of the xpath expression is not an element');
            }
            found.push(item);
          }
          break;
        default:
          fail(32, 'Unsupported locator strategy: ' + using);
      }
    } catch (e) {
      if (typeof e.status === 'number') {
        throw e;
      }
      fail(using === 'xpath' ? 19 : 32, e.message);
    }
    return Array.prototype.slice.call(found);
  }
"#;

pub const IS_DISPLAYED: &str = "function (el) { return isShown(el); }";

pub const IS_ENABLED: &str = r#"function (el) {
  if (el.disabled) {
    return false;
  }
  var fieldset = el.closest('fieldset[disabled]');
  if (fieldset) {
    var legend = fieldset.querySelector('legend');
    return !!(legend && legend.contains(el));
  }
  return true;
}"#;

pub const GET_LOCATION: &str = r#"function (el) {
  var rect = el.getBoundingClientRect();
  return {
    x: Math.round(rect.left + window.pageXOffset),
    y: Math.round(rect.top + window.pageYOffset)
  };
}"#;

pub const GET_LOCATION_IN_VIEW: &str = r#"function (el) {
  var rect = el.getBoundingClientRect();
  if (rect.top < 0 || rect.left < 0 || rect.bottom > window.innerHeight || rect.right > window.innerWidth) {
    el.scrollIntoView({ block: 'center', inline: 'center' });
    rect = el.getBoundingClientRect();
  }
  return { x: Math.round(rect.left), y: Math.round(rect.top) };
}"#;

pub const GET_SIZE: &str = r#"function (el) {
  var rect = el.getBoundingClientRect();
  return { width: Math.round(rect.width), height: Math.round(rect.height) };
}"#;

pub const GET_NAME: &str = "function (el) { return el.tagName.toLowerCase(); }";

pub const GET_ATTRIBUTE_VALUE: &str = r#"function (el, name) {
  var BOOLEAN_ATTRIBUTES = ['async', 'autofocus', 'autoplay', 'checked', 'compact', 'complete',
    'controls', 'declare', 'defaultchecked', 'defaultselected', 'defer', 'disabled', 'draggable',
    'ended', 'formnovalidate', 'hidden', 'indeterminate', 'iscontenteditable', 'ismap', 'itemscope',
    'loop', 'multiple', 'muted', 'nohref', 'noresize', 'noshade', 'novalidate', 'nowrap', 'open',
    'paused', 'pubdate', 'readonly', 'required', 'reversed', 'scoped', 'seamless', 'seeking',
    'selected', 'spellcheck', 'truespeed', 'willvalidate'];
  var lower = String(name).toLowerCase();
  if (lower === 'style') {
    return el.style.cssText;
  }
  if (lower === 'selected' || lower === 'checked') {
    return el[lower] ? 'true' : null;
  }
  if (BOOLEAN_ATTRIBUTES.indexOf(lower) !== -1) {
    return (el.hasAttribute(name) || el[name] === true) ? 'true' : null;
  }
  var property = el[name];
  if (property !== undefined && property !== null && typeof property !== 'object' && typeof property !== 'function') {
    return String(property);
  }
  return el.getAttribute(name);
}"#;

pub const GET_TEXT: &str = r#"function (el) {
  var text = el.innerText !== undefined ? el.innerText : el.textContent;
  return String(text || '').replace(/\u00a0/g, ' ').replace(/[ \t]+\n/g, '\n').trim();
}"#;

pub const EQUALS: &str = "function (a, b) { return a === b; }";

pub const SUBMIT: &str = r#"function (el) {
  var form = el.tagName.toUpperCase() === 'FORM' ? el : (el.form || el.closest('form'));
  if (!form) {
    fail(12, 'Element was not in a form, so could not submit.');
  }
  var evt = document.createEvent('Event');
  evt.initEvent('submit', true, true);
  if (form.dispatchEvent(evt)) {
    HTMLFormElement.prototype.submit.call(form);
  }
  return null;
}"#;

pub const CLICK: &str = r#"function (el) {
  if (!isShown(el)) {
    fail(11, 'Element is not currently visible and may not be manipulated');
  }
  el.scrollIntoView({ block: 'center', inline: 'center' });
  var rect = el.getBoundingClientRect();
  var opts = {
    bubbles: true,
    cancelable: true,
    view: window,
    clientX: rect.left + rect.width / 2,
    clientY: rect.top + rect.height / 2,
    button: 0
  };
  el.dispatchEvent(new MouseEvent('mouseover', opts));
  el.dispatchEvent(new MouseEvent('mousedown', opts));
  if (typeof el.focus === 'function') {
    el.focus();
  }
  el.dispatchEvent(new MouseEvent('mouseup', opts));
  el.click();
  return null;
}"#;

pub const IS_SELECTED: &str = r#"function (el) {
  var tag = el.tagName.toUpperCase();
  var type = (el.type || '').toLowerCase();
  if (tag === 'OPTION') {
    return !!el.selected;
  }
  if (tag === 'INPUT' && (type === 'checkbox' || type === 'radio')) {
    return !!el.checked;
  }
  fail(15, 'Element is not selectable');
}"#;

pub const CLEAR: &str = r#"function (el) {
  if (el.disabled || el.readOnly) {
    fail(12, 'Element must be user-editable in order to clear it.');
  }
  if (el.isContentEditable) {
    el.innerHTML = '';
  } else if ('value' in el) {
    el.value = '';
  } else {
    fail(12, 'Element must be user-editable in order to clear it.');
  }
  el.dispatchEvent(new Event('input', { bubbles: true }));
  el.dispatchEvent(new Event('change', { bubbles: true }));
  return null;
}"#;

pub const GET_VALUE_OF_CSS_PROPERTY: &str = r#"function (el, property) {
  var value = window.getComputedStyle(el).getPropertyValue(property);
  var rgb = /^rgb\((\d+),\s*(\d+),\s*(\d+)\)$/.exec(value);
  if (rgb) {
    return 'rgba(' + rgb[1] + ', ' + rgb[2] + ', ' + rgb[3] + ', 1)';
  }
  return value;
}"#;

pub const IS_FILE_INPUT: &str = r#"function (el) {
  return el.tagName.toUpperCase() === 'INPUT' && (el.type || '').toLowerCase() === 'file';
}"#;

pub const IS_CONTENT_EDITABLE: &str = "function (el) { return !!el.isContentEditable; }";

/// In-page typing used when native events are disabled. Also used with an
/// empty string to focus an element before native key delivery.
pub const TYPE: &str = r#"function (el, text, caretToEnd) {
  if (!isShown(el)) {
    fail(11, 'Element is not currently visible and may not be manipulated');
  }
  if (document.activeElement !== el && typeof el.focus === 'function') {
    el.focus();
  }
  var editable = el.isContentEditable;
  if (caretToEnd) {
    if (editable) {
      var range = document.createRange();
      range.selectNodeContents(el);
      range.collapse(false);
      var selection = window.getSelection();
      selection.removeAllRanges();
      selection.addRange(range);
    } else if (typeof el.setSelectionRange === 'function') {
      try {
        var end = String(el.value || '').length;
        el.setSelectionRange(end, end);
      } catch (ignored) {}
    }
  }

  function key(type, ch) {
    return el.dispatchEvent(new KeyboardEvent(type, { key: ch, bubbles: true, cancelable: true }));
  }

  function insert(ch) {
    if (editable) {
      document.execCommand('insertText', false, ch);
    } else if ('value' in el) {
      el.value = String(el.value || '') + ch;
    }
    el.dispatchEvent(new Event('input', { bubbles: true }));
  }

  var chars = Array.from(String(text || ''));
  for (var i = 0; i < chars.length; i++) {
    var ch = chars[i];
    var code = ch.charCodeAt(0);
    if (ch === '\uE003') {
      key('keydown', 'Backspace');
      if (editable) {
        document.execCommand('delete', false);
      } else if ('value' in el) {
        el.value = String(el.value || '').slice(0, -1);
      }
      el.dispatchEvent(new Event('input', { bubbles: true }));
      key('keyup', 'Backspace');
    } else if (ch === '\uE006' || ch === '\uE007') {
      key('keydown', 'Enter');
      key('keypress', 'Enter');
      if (el.tagName.toUpperCase() === 'TEXTAREA' || editable) {
        insert('\n');
      } else if (el.form) {
        var evt = document.createEvent('Event');
        evt.initEvent('submit', true, true);
        if (el.form.dispatchEvent(evt)) {
          HTMLFormElement.prototype.submit.call(el.form);
        }
      }
      key('keyup', 'Enter');
    } else if (ch === '\uE004') {
      key('keydown', 'Tab');
      key('keyup', 'Tab');
    } else if (code >= 0xE000 && code <= 0xF8FF) {
      continue;
    } else {
      if (key('keydown', ch) && key('keypress', ch)) {
        insert(ch);
      }
      key('keyup', ch);
    }
  }
  return null;
}"#;

pub const SCROLL_INTO_VIEW: &str = r#"function (el) {
  var rect = el.getBoundingClientRect();
  if (rect.top < 0 || rect.left < 0 || rect.bottom > window.innerHeight || rect.right > window.innerWidth) {
    el.scrollIntoView({ block: 'center', inline: 'center' });
  }
  return true;
}"#;

pub const FIND_ELEMENT: &str = r#"function (using, value, root) {
  var found = locate(using, value, root);
  if (!found.length) {
    fail(7, 'Unable to find element with ' + using + " '" + value + "'");
  }
  return found[0];
}"#;

pub const FIND_ELEMENTS: &str = "function (using, value, root) { return locate(using, value, root); }";

pub const MARK_UPLOAD_TARGET: &str = r#"function (el, token) {
  el.setAttribute('data-ghost-upload', token);
  return '[data-ghost-upload="' + token + '"]';
}"#;
